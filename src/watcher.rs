//! DOM change watcher
//!
//! Client-side routed sites change the logical page without a navigation
//! event, and most video sites insert their media elements well after the
//! initial load. The watcher handles both from the same mutation feed:
//!
//! - location changed since the last mutation: reload the site's settings
//! - same location: re-apply the current speed once the DOM settles

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::SpeedController;
use crate::page::MutationEvent;
use crate::timer::Debouncer;

/// What a mutation led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Location changed; settings were reloaded for the new page
    Navigated,
    /// A debounced re-apply was (re)scheduled
    Scheduled,
    /// Controller is disabled; nothing to do
    Ignored,
}

/// Reacts to DOM mutations on behalf of a [`SpeedController`]
pub struct ChangeWatcher {
    controller: Arc<SpeedController>,
    last_location: Mutex<String>,
    debouncer: Debouncer,
}

impl ChangeWatcher {
    /// Create a watcher, taking the document's current location as the
    /// starting point
    pub fn new(controller: Arc<SpeedController>) -> Self {
        let last_location = controller.document().location();
        let debouncer = Debouncer::new(controller.config().debounce_window);

        Self {
            controller,
            last_location: Mutex::new(last_location),
            debouncer,
        }
    }

    /// Location seen at the last mutation
    pub fn last_location(&self) -> String {
        self.last_location.lock().clone()
    }

    /// Whether a re-apply is waiting for the quiet window to close
    pub fn has_pending_apply(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Handle one mutation
    pub async fn on_mutation(&self) -> MutationOutcome {
        let location = self.controller.document().location();

        let navigated = {
            let mut last = self.last_location.lock();
            if *last != location {
                *last = location.clone();
                true
            } else {
                false
            }
        };

        if navigated {
            tracing::debug!(location = %location, "Navigation detected, reloading site settings");
            self.controller.load_for_site().await;
            return MutationOutcome::Navigated;
        }

        if !self.controller.is_enabled() {
            return MutationOutcome::Ignored;
        }

        let controller = Arc::clone(&self.controller);
        self.debouncer.trigger(move || {
            if controller.is_enabled() {
                controller.apply_current();
            }
        });

        MutationOutcome::Scheduled
    }

    /// Process mutations until the feed closes
    pub async fn run(&self, mut mutations: mpsc::Receiver<MutationEvent>) {
        while let Some(event) = mutations.recv().await {
            tracing::trace!(added = event.added, removed = event.removed, "DOM mutation");
            self.on_mutation().await;
        }

        self.debouncer.cancel();
        tracing::debug!("Mutation feed closed");
    }

    /// Spawn [`run`](Self::run) as a background task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn(self: &Arc<Self>, mutations: mpsc::Receiver<MutationEvent>) -> JoinHandle<()> {
        let watcher = Arc::clone(self);
        tokio::spawn(async move { watcher.run(mutations).await })
    }
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("last_location", &self.last_location())
            .field("pending_apply", &self.has_pending_apply())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;
    use crate::config::ControllerConfig;
    use crate::page::{MediaElement, SimDocument, SimOverlaySurface};
    use crate::site::Site;
    use crate::storage::{MemoryStore, StoredRecord};

    fn setup(record: StoredRecord) -> (Arc<SimDocument>, Arc<SimOverlaySurface>, ChangeWatcher) {
        let doc = Arc::new(SimDocument::new("https://a.example/home"));
        let surface = Arc::new(SimOverlaySurface::new());
        let controller = Arc::new(SpeedController::new(
            ControllerConfig::default(),
            doc.clone(),
            Arc::new(MemoryStore::with_record(record)),
            surface.clone(),
        ));
        (doc, surface, ChangeWatcher::new(controller))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_applies_once() {
        let (doc, _surface, watcher) = setup(StoredRecord::default());
        let media = doc.insert_media();
        watcher.controller.load_for_site().await;
        let writes_before = media.rate_writes();

        for _ in 0..10 {
            assert_eq!(watcher.on_mutation().await, MutationOutcome::Scheduled);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(media.rate_writes(), writes_before);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(media.rate_writes(), writes_before + 1);
        assert!(!watcher.has_pending_apply());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_media_gets_current_speed() {
        let mut speeds = BTreeMap::new();
        speeds.insert(Site::new("https://a.example"), 1.5);
        let (doc, _surface, watcher) = setup(StoredRecord::with_site_speeds(speeds));
        watcher.controller.load_for_site().await;

        let media = doc.insert_media();
        watcher.on_mutation().await;
        tokio::time::sleep(Duration::from_millis(201)).await;

        assert_eq!(media.playback_rate(), 1.5);
        assert_eq!(media.listener_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_reloads_without_overlay() {
        let mut speeds = BTreeMap::new();
        speeds.insert(Site::new("https://b.example"), 3.0);
        let (doc, surface, watcher) = setup(StoredRecord::with_site_speeds(speeds));
        let media = doc.insert_media();
        watcher.controller.load_for_site().await;
        assert_eq!(media.playback_rate(), 1.0);

        doc.navigate("https://b.example/watch");
        assert_eq!(watcher.on_mutation().await, MutationOutcome::Navigated);

        assert_eq!(watcher.last_location(), "https://b.example/watch");
        assert_eq!(watcher.controller.state().current_speed, 3.0);
        assert_eq!(media.playback_rate(), 3.0);
        assert!(surface.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_site_ignores_mutations() {
        let record = StoredRecord::with_disabled_sites(vec![Site::new("https://a.example")]);
        let (doc, _surface, watcher) = setup(record);
        watcher.controller.load_for_site().await;

        doc.insert_media();
        assert_eq!(watcher.on_mutation().await, MutationOutcome::Ignored);
        assert!(!watcher.has_pending_apply());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_drains_feed() {
        let (doc, _surface, watcher) = setup(StoredRecord::default());
        let watcher = Arc::new(watcher);
        let rx = doc.observe(16);
        let handle = watcher.spawn(rx);

        let media = doc.insert_media();
        doc.touch();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(media.rate_writes(), 1);

        // Closing the feed ends the task
        drop(doc.observe(1));
        handle.await.unwrap();
    }
}
