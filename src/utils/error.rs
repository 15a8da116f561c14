//! Error handling for castdesk

use thiserror::Error;

/// Main error type for castdesk
#[derive(Debug, Error)]
pub enum CastdeskError {
    #[error("No storage engine matches URL: {0}")]
    UnsupportedUrl(String),

    #[error("Storage engine already registered: {0}")]
    DuplicateEngine(String),

    #[error("Unknown storage engine: {0}")]
    UnknownEngine(String),

    #[error("Malformed unique id for {engine}: {unique_id}")]
    InvalidUniqueId { engine: String, unique_id: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse remote metadata: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CastdeskError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
