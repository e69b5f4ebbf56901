//! Error types
//!
//! Crate-wide error and result types. Storage backends report their own
//! [`StorageError`], which converts into [`Error`].

use thiserror::Error;

use crate::storage::StorageError;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Storage backend failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Message could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Page location is not a URL an origin can be derived from
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Message endpoint is no longer serving requests
    #[error("message endpoint closed")]
    EndpointClosed,
}

/// Result alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
