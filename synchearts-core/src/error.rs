//! Error types for SyncHearts.

use thiserror::Error;

/// Errors that can occur in SyncHearts operations.
///
/// Most of these never reach a user: remote failures are logged and treated as
/// "not found", and unreadable local data degrades to an empty document.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Remote responded with status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Couple key must not be empty")]
    EmptyCoupleKey,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD, \"today\" or +N")]
    InvalidDate(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Remote(e.to_string())
    }
}

/// Result type alias for SyncHearts operations.
pub type SyncResult<T> = Result<T, SyncError>;
