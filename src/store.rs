use crate::config::FailurePolicy;
use crate::error::CatalogError;
use crate::models::Movie;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub type Item = HashMap<String, AttributeValue>;

pub const MEDIA_TYPE_ATTRIBUTE: &str = "media_type";
pub const SEARCH_USAGE: &str =
    "Search endpoint should be properly formed by /search?mediaType=string";

static MEDIA_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][^0-9]+$").expect("media type pattern is valid"));

/// Backend-evaluated `contains(attribute, value)` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainsFilter {
    pub attribute: String,
    pub value: String,
}

impl ContainsFilter {
    pub fn media_type(value: &str) -> Self {
        Self {
            attribute: MEDIA_TYPE_ATTRIBUTE.to_string(),
            value: value.to_string(),
        }
    }
}

/// Raw result of one scan: undecoded items plus the backend's own count.
#[derive(Debug, Clone, Default)]
pub struct RawScan {
    pub items: Vec<Item>,
    pub count: i64,
}

#[async_trait]
pub trait TableScanner: Send + Sync {
    async fn scan(&self, filter: Option<&ContainsFilter>) -> Result<RawScan, CatalogError>;
}

/// Decoded movies of one scan, owned by the request that asked for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSnapshot {
    pub movies: Vec<Movie>,
    /// Item count reported by the backend; `None` if the scan itself failed.
    pub count: Option<i64>,
}

#[derive(Clone)]
pub struct Catalog {
    scanner: Arc<dyn TableScanner>,
    policy: FailurePolicy,
}

impl Catalog {
    pub fn new(scanner: Arc<dyn TableScanner>, policy: FailurePolicy) -> Self {
        Self { scanner, policy }
    }

    /// Full scan of the table.
    ///
    /// Under [`FailurePolicy::Open`] a failed scan yields an empty snapshot
    /// and undecodable items are skipped, so `count` can exceed
    /// `movies.len()`. Under [`FailurePolicy::Closed`] both are errors.
    pub async fn refresh_all(&self) -> Result<ScanSnapshot, CatalogError> {
        let raw = match self.scanner.scan(None).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to scan table: {}", e);
                return match self.policy {
                    FailurePolicy::Open => Ok(ScanSnapshot::default()),
                    FailurePolicy::Closed => Err(e),
                };
            }
        };
        info!(count = raw.count, items = raw.items.len(), "Scanned table");

        let mut movies = Vec::with_capacity(raw.items.len());
        for (index, item) in raw.items.iter().enumerate() {
            match decode_movie(item) {
                Ok(movie) => movies.push(movie),
                Err(reason) => {
                    warn!("Failed to decode item {}: {}", index, reason);
                    if self.policy == FailurePolicy::Closed {
                        return Err(CatalogError::DecodeFailure { index, reason });
                    }
                }
            }
        }

        Ok(ScanSnapshot {
            movies,
            count: Some(raw.count),
        })
    }

    /// Filtered scan for movies whose `media_type` contains `media_type`.
    /// Invalid input is rejected before the backend is contacted.
    pub async fn search(&self, media_type: &str) -> Result<Vec<Movie>, CatalogError> {
        if !is_valid_media_type(media_type) {
            return Err(CatalogError::InvalidQuery(SEARCH_USAGE.to_string()));
        }

        let filter = ContainsFilter::media_type(media_type);
        let raw = self.scanner.scan(Some(&filter)).await.map_err(|e| {
            error!("Search scan failed for '{}': {}", media_type, e);
            e
        })?;
        info!(media_type, count = raw.count, "Search scan complete");

        raw.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                decode_movie(item).map_err(|reason| {
                    error!("Failed to decode search item {}: {}", index, reason);
                    CatalogError::DecodeFailure { index, reason }
                })
            })
            .collect()
    }
}

/// `^[a-zA-Z][^0-9]+$`: a letter, then at least one more character, no digits.
pub fn is_valid_media_type(value: &str) -> bool {
    MEDIA_TYPE_PATTERN.is_match(value)
}

/// Decodes one table item. Missing or `NULL` attributes become zero values;
/// a mistyped or unparsable attribute fails the item.
pub fn decode_movie(item: &Item) -> Result<Movie, String> {
    Ok(Movie {
        id: number_attr(item, "Id")?,
        title: string_attr(item, "Title")?,
        vote_average: number_attr(item, "vote_average")?,
        original_language: string_attr(item, "original_language")?,
        overview: string_attr(item, "overview")?,
        popularity: number_attr(item, "popularity")?,
        media_type: string_attr(item, MEDIA_TYPE_ATTRIBUTE)?,
    })
}

fn string_attr(item: &Item, name: &str) -> Result<String, String> {
    match item.get(name) {
        None | Some(AttributeValue::Null(_)) => Ok(String::new()),
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        Some(other) => Err(format!("attribute '{}' is not a string: {:?}", name, other)),
    }
}

fn number_attr<T>(item: &Item, name: &str) -> Result<T, String>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    match item.get(name) {
        None | Some(AttributeValue::Null(_)) => Ok(T::default()),
        Some(AttributeValue::N(raw)) => raw
            .parse::<T>()
            .map_err(|e| format!("attribute '{}' has invalid number '{}': {}", name, raw, e)),
        Some(other) => Err(format!("attribute '{}' is not a number: {:?}", name, other)),
    }
}
