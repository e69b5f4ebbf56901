//! Persisted record layout
//!
//! The store holds a single JSON document with two top-level keys:
//!
//! ```json
//! {
//!   "siteSpeeds": { "https://www.youtube.com": 1.75 },
//!   "disabledSites": ["https://music.example.com"]
//! }
//! ```
//!
//! Reads and writes are partial: a [`StoredRecord`] only carries the keys
//! that were requested or are being written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::site::Site;

/// Top-level key in the persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Site → speed map
    SiteSpeeds,
    /// List of sites the controller is disabled on
    DisabledSites,
}

impl RecordKey {
    /// Every key in the record
    pub const ALL: [RecordKey; 2] = [RecordKey::SiteSpeeds, RecordKey::DisabledSites];

    /// Key name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKey::SiteSpeeds => "siteSpeeds",
            RecordKey::DisabledSites => "disabledSites",
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial view of the persisted record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Saved speed per site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_speeds: Option<BTreeMap<Site, f64>>,

    /// Sites the controller is disabled on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_sites: Option<Vec<Site>>,
}

impl StoredRecord {
    /// Record carrying only a site speed map
    pub fn with_site_speeds(site_speeds: BTreeMap<Site, f64>) -> Self {
        Self {
            site_speeds: Some(site_speeds),
            disabled_sites: None,
        }
    }

    /// Record carrying only a disabled site list
    pub fn with_disabled_sites(disabled_sites: Vec<Site>) -> Self {
        Self {
            site_speeds: None,
            disabled_sites: Some(disabled_sites),
        }
    }

    /// Keep only the requested keys
    pub fn project(&self, keys: &[RecordKey]) -> Self {
        Self {
            site_speeds: if keys.contains(&RecordKey::SiteSpeeds) {
                self.site_speeds.clone()
            } else {
                None
            },
            disabled_sites: if keys.contains(&RecordKey::DisabledSites) {
                self.disabled_sites.clone()
            } else {
                None
            },
        }
    }

    /// Overwrite every key present in `other`, leaving the rest untouched
    pub fn merge(&mut self, other: StoredRecord) {
        if let Some(site_speeds) = other.site_speeds {
            self.site_speeds = Some(site_speeds);
        }
        if let Some(disabled_sites) = other.disabled_sites {
            self.disabled_sites = Some(disabled_sites);
        }
    }
}
