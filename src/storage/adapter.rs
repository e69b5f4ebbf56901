//! Storage adapter used by the speed controller
//!
//! Translates controller operations into reads and writes of the persisted
//! record. Both write paths are read-modify-write cycles over a shared map
//! or list and are serialized through `write_lock`.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::site::Site;

use super::error::StorageError;
use super::record::{RecordKey, StoredRecord};
use super::SiteStore;

/// Preferences stored for one site
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SitePreferences {
    /// Saved speed, if the user ever changed it on this site
    pub speed: Option<f64>,
    /// Whether the site is in the disabled set
    pub disabled: bool,
}

/// Adapter over a [`SiteStore`] backend
pub struct SpeedStorage {
    store: Arc<dyn SiteStore>,
    write_lock: Mutex<()>,
}

impl SpeedStorage {
    /// Wrap a store backend
    pub fn new(store: Arc<dyn SiteStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<dyn SiteStore> {
        &self.store
    }

    /// Load the saved speed and disabled flag for a site
    pub async fn load(&self, site: &Site) -> Result<SitePreferences, StorageError> {
        let record = self.store.get(&RecordKey::ALL).await?;

        let disabled = record
            .disabled_sites
            .as_ref()
            .is_some_and(|sites| sites.contains(site));
        let speed = record
            .site_speeds
            .as_ref()
            .and_then(|speeds| speeds.get(site).copied());

        Ok(SitePreferences { speed, disabled })
    }

    /// Save the speed for a site, keeping every other site's entry
    pub async fn save_speed(&self, site: &Site, speed: f64) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let record = self.store.get(&[RecordKey::SiteSpeeds]).await?;
        let mut speeds = record.site_speeds.unwrap_or_default();
        speeds.insert(site.clone(), speed);

        self.store.set(StoredRecord::with_site_speeds(speeds)).await?;

        tracing::debug!(site = %site, speed = speed, "Site speed saved");
        Ok(())
    }

    /// Add a site to, or remove it from, the disabled set
    ///
    /// Returns the disabled set as written.
    pub async fn set_disabled(
        &self,
        site: &Site,
        disabled: bool,
    ) -> Result<Vec<Site>, StorageError> {
        let _guard = self.write_lock.lock().await;

        let record = self.store.get(&[RecordKey::DisabledSites]).await?;
        let mut sites = record.disabled_sites.unwrap_or_default();

        if disabled {
            if !sites.contains(site) {
                sites.push(site.clone());
            }
        } else {
            sites.retain(|s| s != site);
        }

        self.store
            .set(StoredRecord::with_disabled_sites(sites.clone()))
            .await?;

        Ok(sites)
    }
}

impl std::fmt::Debug for SpeedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedStorage").finish_non_exhaustive()
    }
}
