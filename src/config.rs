use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_TABLE: &str = "dtran4-tmdbmovie";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PORT: u16 = 8080;

/// What `/all` and `/status` do when the scan or an item decode fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log and answer with whatever decoded (possibly nothing).
    #[default]
    Open,
    /// Fail the request with an internal error.
    Closed,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(FailurePolicy::Open),
            "closed" => Ok(FailurePolicy::Closed),
            other => Err(anyhow!(
                "Unknown failure policy '{}', expected 'open' or 'closed'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub port: u16,
    pub route_prefix: String,
    pub failure_policy: FailurePolicy,
    /// `DescribeTable` the target before binding. Needs
    /// `dynamodb:DescribeTable` on top of `dynamodb:Scan`; turn it off
    /// (`MOVIES_STARTUP_CHECK=false`) for scan-only roles.
    pub startup_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            port: DEFAULT_PORT,
            route_prefix: String::new(),
            failure_policy: FailurePolicy::Open,
            startup_check: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; unset or blank
    /// keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let port = match get("MOVIES_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("MOVIES_PORT must be a port number, got '{}'", raw))?,
            None => defaults.port,
        };

        let route_prefix = get("MOVIES_ROUTE_PREFIX")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or_default();
        if !route_prefix.is_empty() && !route_prefix.starts_with('/') {
            bail!("MOVIES_ROUTE_PREFIX must start with '/', got '{}'", route_prefix);
        }

        let failure_policy = match get("MOVIES_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.failure_policy,
        };

        let startup_check = match get("MOVIES_STARTUP_CHECK") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                anyhow!("MOVIES_STARTUP_CHECK must be true or false, got '{}'", raw)
            })?,
            None => defaults.startup_check,
        };

        Ok(Self {
            table_name: get("MOVIES_TABLE").unwrap_or(defaults.table_name),
            region: get("MOVIES_REGION").unwrap_or(defaults.region),
            endpoint_url: get("MOVIES_DYNAMODB_ENDPOINT"),
            port,
            route_prefix,
            failure_policy,
            startup_check,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
