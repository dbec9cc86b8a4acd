// src/utils/error.rs
use thiserror::Error;

/// Failures talking to the fraud incident record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("Invalid table name {0:?}")]
    InvalidTableName(String),

    #[error("Invalid continuation token: {0:?}")]
    BadContinuationToken(String),
}

// Failures against the sec-api.io query and extractor endpoints
#[derive(Error, Debug)]
pub enum SecApiError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("sec-api.io rejected the API key")]
    Unauthorized,

    #[error("sec-api.io rate limit exceeded")]
    RateLimited,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to parse sec-api.io response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid archive key: {0:?}")]
    InvalidKey(String),
}

/// Why a single resolved filing could not be archived.
#[derive(Error, Debug)]
pub enum ArchiveFailure {
    #[error("extracting section {section} failed: {source}")]
    Extraction {
        section: &'static str,
        #[source]
        source: SecApiError,
    },

    #[error("archive write failed: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Archive store unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("sec-api.io client error: {0}")]
    SecApi(#[from] SecApiError),

    #[error("Invalid incident file: {0}")]
    Json(#[from] serde_json::Error),
}
