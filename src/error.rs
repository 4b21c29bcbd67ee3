//! Error types for homedash

use std::time::Duration;
use thiserror::Error;

/// Result type alias for homedash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dashboard backend is offline: {0}")]
    Offline(FetchError),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Failures of a single network request.
///
/// `Http` and `Parse` are produced by callers that classify a response;
/// an [`HttpFetch`](crate::client::HttpFetch) implementation only ever
/// yields `Timeout`, `Network` or `InvalidUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned error status: {0}")]
    Http(u16),

    #[error("Invalid response body: {0}")]
    Parse(String),

    #[error("No cached response available for {0}")]
    NoCachedResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether the request never produced a response at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchError::Timeout(_) | FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            FetchError::Network("Failed to connect to server".to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Asset cache storage errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Sqlite(String),

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Could not determine cache directory")]
    NoCacheDir,
}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::Sqlite(err.to_string())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
