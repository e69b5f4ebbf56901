//! Persistent per-site preferences
//!
//! The controller talks to storage through [`SpeedStorage`], which wraps any
//! [`SiteStore`] backend and implements the read-modify-write cycles for
//! saving speeds and toggling sites.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process, lost with the page
//! - [`JsonFileStore`]: a single JSON document on disk

pub mod adapter;
pub mod error;
pub mod file;
pub mod memory;
pub mod record;

use async_trait::async_trait;

pub use adapter::{SitePreferences, SpeedStorage};
pub use error::StorageError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{RecordKey, StoredRecord};

/// Async key-value backend holding the persisted record
///
/// `get` returns only the requested keys; keys that were never written come
/// back as `None`. `set` writes every `Some` field and leaves the others
/// untouched.
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Read the requested keys
    async fn get(&self, keys: &[RecordKey]) -> Result<StoredRecord, StorageError>;

    /// Write the keys present in `record`
    async fn set(&self, record: StoredRecord) -> Result<(), StorageError>;
}
