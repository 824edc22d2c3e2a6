use serde::{Deserialize, Serialize};

/// One catalog entry as stored in the movie table.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Movie {
    #[serde(rename = "Id")]
    pub id: i64,
    pub title: String,
    pub vote_average: f64,
    pub original_language: String,
    pub overview: String,
    pub popularity: f64,
    pub media_type: String,
}

/// Wrapped list shape (`{"results": [...]}`).
///
/// `/all` and `/search` serve bare arrays; this shape is kept for clients
/// that expect the wrapped form.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MovieList {
    pub results: Vec<Movie>,
}

impl From<Vec<Movie>> for MovieList {
    fn from(results: Vec<Movie>) -> Self {
        Self { results }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TableStatus {
    pub table: String,
    #[serde(rename = "recordCount")]
    pub record_count: Option<i64>,
}
