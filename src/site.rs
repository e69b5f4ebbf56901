//! Site identity
//!
//! A site is the origin (scheme + host + port) of the page the controller
//! runs in. It is the key for every persisted preference.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Origin of a page, serialized the way browsers render `location.origin`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Site(String);

impl Site {
    /// Wrap an already-serialized origin string
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    /// Derive the site from a full page location
    ///
    /// Default ports are dropped and the host is lowercased. Opaque origins
    /// (`data:`, `about:blank`, ...) serialize as `null`.
    pub fn from_location(location: &str) -> Result<Self> {
        let url = Url::parse(location)
            .map_err(|e| Error::InvalidLocation(format!("{}: {}", location, e)))?;

        Ok(Self(url.origin().ascii_serialization()))
    }

    /// Get the origin string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Site {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
