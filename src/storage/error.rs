//! Storage error types

use thiserror::Error;

/// Error type for storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend could not be reached or refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data does not have the expected shape
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
