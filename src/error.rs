//! Error types for query parameter synchronization.

use thiserror::Error;

/// Main error type for query-sync operations.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("History interception is not installed")]
    NotInstalled,

    #[error("Browser API unavailable: {0}")]
    Unavailable(String),

    #[error("History call rejected: {0}")]
    History(String),

    #[error("Updater failed: {0}")]
    Updater(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Serialization(e.to_string())
    }
}

/// Result type for query-sync operations.
pub type Result<T> = std::result::Result<T, QueryError>;
