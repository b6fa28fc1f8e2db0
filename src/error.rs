//! Error types for the revision notifier.

use thiserror::Error;

/// Main error type for notifier operations.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    #[error("Snapshot decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for NotifierError {
    fn from(e: serde_json::Error) -> Self {
        NotifierError::Serialization(e.to_string())
    }
}

/// Result type for notifier operations.
pub type Result<T> = std::result::Result<T, NotifierError>;
