//! JSON file store
//!
//! Persists the record as one JSON document. Writes go to a sibling
//! temporary file which is then renamed over the target, so a crash never
//! leaves a half-written record behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::StorageError;
use super::record::{RecordKey, StoredRecord};
use super::SiteStore;

/// Store backed by a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-merge-write cycles against the file
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store for the given file. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_record(&self) -> Result<StoredRecord, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(StoredRecord::default()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                StorageError::Corrupt(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredRecord::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_record(&self, record: &StoredRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(record)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait]
impl SiteStore for JsonFileStore {
    async fn get(&self, keys: &[RecordKey]) -> Result<StoredRecord, StorageError> {
        let _guard = self.io_lock.lock().await;
        Ok(self.read_record().await?.project(keys))
    }

    async fn set(&self, record: StoredRecord) -> Result<(), StorageError> {
        let _guard = self.io_lock.lock().await;

        let mut current = self.read_record().await?;
        current.merge(record);
        self.write_record(&current).await?;

        tracing::trace!(path = %self.path.display(), "Record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::site::Site;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("speeds.json"));

        let record = store.get(&RecordKey::ALL).await.unwrap();
        assert_eq!(record, StoredRecord::default());
    }

    #[tokio::test]
    async fn test_set_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("speeds.json");

        let mut speeds = BTreeMap::new();
        speeds.insert(Site::new("https://a.example"), 2.5);
        JsonFileStore::new(&path)
            .set(StoredRecord::with_site_speeds(speeds))
            .await
            .unwrap();
        JsonFileStore::new(&path)
            .set(StoredRecord::with_disabled_sites(vec![Site::new(
                "https://b.example",
            )]))
            .await
            .unwrap();

        let record = JsonFileStore::new(&path).get(&RecordKey::ALL).await.unwrap();
        assert_eq!(
            record.site_speeds.unwrap().get(&Site::new("https://a.example")),
            Some(&2.5)
        );
        assert_eq!(
            record.disabled_sites.unwrap(),
            vec![Site::new("https://b.example")]
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speeds.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let result = JsonFileStore::new(&path).get(&RecordKey::ALL).await;
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }
}
