//! In-memory store

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::record::{RecordKey, StoredRecord};
use super::SiteStore;

/// Store backed by process memory
///
/// Can be switched into an unavailable state to exercise the controller's
/// fallback paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RwLock<StoredRecord>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a record
    pub fn with_record(record: StoredRecord) -> Self {
        Self {
            record: RwLock::new(record),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Copy of the full stored record
    pub async fn snapshot(&self) -> StoredRecord {
        self.record.read().await.clone()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::Relaxed) {
            Err(StorageError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn get(&self, keys: &[RecordKey]) -> Result<StoredRecord, StorageError> {
        self.check_available()?;
        Ok(self.record.read().await.project(keys))
    }

    async fn set(&self, record: StoredRecord) -> Result<(), StorageError> {
        self.check_available()?;
        self.record.write().await.merge(record);
        Ok(())
    }
}
