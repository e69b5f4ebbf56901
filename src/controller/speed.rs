//! Speed controller implementation

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::media::MediaRegistry;
use crate::overlay::Overlay;
use crate::page::{Document, OverlaySurface};
use crate::site::Site;
use crate::storage::{SitePreferences, SiteStore, SpeedStorage};

use super::state::{ControllerState, SpeedStatus};

/// Per-page speed controller
///
/// Create one per document. Methods that touch storage are async; state is
/// never borrowed across an await, so concurrent handlers always see a
/// consistent snapshot.
pub struct SpeedController {
    config: ControllerConfig,
    document: Arc<dyn Document>,
    storage: SpeedStorage,
    media: MediaRegistry,
    overlay: Overlay,
    state: watch::Sender<ControllerState>,
}

impl SpeedController {
    /// Create a controller in its initial state (enabled, normal speed)
    ///
    /// Nothing is loaded yet; call [`load_for_site`](Self::load_for_site).
    pub fn new(
        config: ControllerConfig,
        document: Arc<dyn Document>,
        store: Arc<dyn SiteStore>,
        overlay_surface: Arc<dyn OverlaySurface>,
    ) -> Self {
        let (state, state_rx) =
            watch::channel(ControllerState::new(config.bounds.default_speed()));

        let media = MediaRegistry::new(Arc::clone(&document), state_rx);
        let overlay = Overlay::new(
            overlay_surface,
            config.overlay_style.clone(),
            config.overlay_duration,
        );

        Self {
            config,
            document,
            storage: SpeedStorage::new(store),
            media,
            overlay,
            state,
        }
    }

    /// Get the controller configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Get the document the controller runs in
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// Get the media registry
    pub fn media(&self) -> &MediaRegistry {
        &self.media
    }

    /// Get the overlay
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ControllerState {
        *self.state.borrow()
    }

    /// Status as reported to UI peers
    pub fn status(&self) -> SpeedStatus {
        self.state.borrow().status()
    }

    /// Whether the controller is active on the current site
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled_for_site
    }

    /// Rate media should currently play at
    pub fn effective_speed(&self) -> f64 {
        self.state.borrow().effective_speed()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Site of the current document location
    pub fn site(&self) -> Result<Site> {
        Site::from_location(&self.document.location())
    }

    /// Apply the effective speed to every media element
    pub fn apply_current(&self) -> usize {
        self.media.apply_to_all(self.effective_speed())
    }

    /// Load enablement and speed for the current site and apply them
    ///
    /// Never shows the overlay. If storage fails the controller falls back to
    /// enabled at normal speed.
    pub async fn load_for_site(&self) -> SpeedStatus {
        let site = match self.site() {
            Ok(site) => site,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot derive site, using defaults");
                return self.apply_preferences(None, SitePreferences::default());
            }
        };

        let prefs = match self.storage.load(&site).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(site = %site, error = %e, "Failed to load site preferences, using defaults");
                SitePreferences::default()
            }
        };

        self.apply_preferences(Some(&site), prefs)
    }

    /// Flip enablement for the current site and persist the disabled set
    ///
    /// Disabling drops media to normal speed. Enabling re-reads the saved
    /// speed. Returns once the disabled set has been written.
    pub async fn toggle_site_enablement(&self) -> SpeedStatus {
        let site = match self.site() {
            Ok(site) => site,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot derive site, toggle ignored");
                return self.status();
            }
        };

        if self.is_enabled() {
            self.state.send_modify(|s| s.disable());
            self.apply_current();
            tracing::info!(site = %site, "Speed control disabled for site");

            if let Err(e) = self.storage.set_disabled(&site, true).await {
                tracing::warn!(site = %site, error = %e, "Failed to persist disabled site");
            }

            self.status()
        } else {
            if let Err(e) = self.storage.set_disabled(&site, false).await {
                tracing::warn!(site = %site, error = %e, "Failed to persist enabled site");
            }

            let prefs = match self.storage.load(&site).await {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::warn!(site = %site, error = %e, "Failed to load site speed, using default");
                    SitePreferences::default()
                }
            };
            tracing::info!(site = %site, "Speed control enabled for site");

            // The site was just removed from the disabled set; a stale read
            // must not disable it again.
            self.apply_preferences(
                Some(&site),
                SitePreferences {
                    disabled: false,
                    ..prefs
                },
            )
        }
    }

    /// Speed up by one step
    pub async fn increase(&self) -> SpeedStatus {
        let bounds = self.config.bounds;
        self.manual_change(|s| s.increase(&bounds)).await
    }

    /// Slow down by one step
    pub async fn decrease(&self) -> SpeedStatus {
        let bounds = self.config.bounds;
        self.manual_change(|s| s.decrease(&bounds)).await
    }

    /// Toggle between normal speed and the last non-normal speed
    pub async fn reset_toggle(&self) -> SpeedStatus {
        let bounds = self.config.bounds;
        self.manual_change(|s| s.reset_toggle(&bounds)).await
    }

    /// Run a user-initiated speed change: apply, show overlay, persist
    async fn manual_change<F>(&self, change: F) -> SpeedStatus
    where
        F: FnOnce(&mut ControllerState),
    {
        let mut changed = None;
        self.state.send_if_modified(|state| {
            if !state.apply_manual(change) {
                return false;
            }
            changed = Some(state.current_speed);
            true
        });

        let Some(speed) = changed else {
            tracing::debug!("Speed command ignored, controller disabled for site");
            return self.status();
        };

        self.media.apply_to_all(self.effective_speed());
        self.overlay.show(speed);

        match self.site() {
            Ok(site) => {
                if let Err(e) = self.storage.save_speed(&site, speed).await {
                    tracing::warn!(site = %site, speed = speed, error = %e, "Failed to persist site speed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot derive site, speed not persisted");
            }
        }

        self.status()
    }

    fn apply_preferences(&self, site: Option<&Site>, prefs: SitePreferences) -> SpeedStatus {
        if prefs.disabled {
            self.state.send_modify(|s| s.disable());
            if let Some(site) = site {
                tracing::info!(site = %site, "Speed control disabled for site");
            }
        } else {
            let bounds = self.config.bounds;
            let speed = match prefs.speed {
                Some(stored) if !bounds.contains(stored) => {
                    let clamped = bounds.clamp(stored);
                    tracing::warn!(
                        stored = stored,
                        clamped = clamped,
                        "Stored speed out of range, clamping"
                    );
                    clamped
                }
                Some(stored) => stored,
                None => bounds.default_speed(),
            };
            self.state.send_modify(|s| s.enable_at(speed));
            if let Some(site) = site {
                tracing::debug!(site = %site, speed = speed, "Site speed loaded");
            }
        }

        self.apply_current();
        self.status()
    }
}

impl std::fmt::Debug for SpeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedController")
            .field("state", &self.state())
            .field("location", &self.document.location())
            .finish()
    }
}
