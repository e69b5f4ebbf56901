//! Simulated page
//!
//! An in-process stand-in for a browser document. Media elements keep their
//! rate and listeners in memory, navigation only swaps the location string
//! (like a single-page app calling `history.pushState`), and every DOM change
//! is reported on a mutation feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use crate::overlay::OverlayStyle;

use super::{
    Document, ElementId, MediaElement, MutationEvent, OverlayId, OverlaySurface, PlayingListener,
};

/// Simulated `<video>`/`<audio>` element
pub struct SimMedia {
    id: ElementId,
    rate: Mutex<f64>,
    rate_writes: AtomicU64,
    listeners: Mutex<Vec<PlayingListener>>,
}

impl SimMedia {
    /// Create a media element at normal speed
    pub fn new(id: u64) -> Self {
        Self {
            id: ElementId(id),
            rate: Mutex::new(1.0),
            rate_writes: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Start playback, firing every `playing` listener
    pub fn play(&self) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener(self as &dyn MediaElement);
        }
    }

    /// Overwrite the rate the way a site's own player would, bypassing the
    /// write counter
    pub fn reset_rate_externally(&self, rate: f64) {
        *self.rate.lock() = rate;
    }

    /// Number of `playing` listeners attached
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Number of times the rate was set through [`MediaElement::set_playback_rate`]
    pub fn rate_writes(&self) -> u64 {
        self.rate_writes.load(Ordering::Relaxed)
    }
}

impl MediaElement for SimMedia {
    fn id(&self) -> ElementId {
        self.id
    }

    fn playback_rate(&self) -> f64 {
        *self.rate.lock()
    }

    fn set_playback_rate(&self, rate: f64) {
        *self.rate.lock() = rate;
        self.rate_writes.fetch_add(1, Ordering::Relaxed);
    }

    fn add_playing_listener(&self, listener: PlayingListener) {
        self.listeners.lock().push(listener);
    }
}

impl std::fmt::Debug for SimMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimMedia")
            .field("id", &self.id)
            .field("rate", &self.playback_rate())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Simulated document
#[derive(Debug)]
pub struct SimDocument {
    location: RwLock<String>,
    media: Mutex<Vec<Arc<SimMedia>>>,
    next_media_id: AtomicU64,
    mutation_tx: Mutex<Option<mpsc::Sender<MutationEvent>>>,
}

impl SimDocument {
    /// Create an empty document at `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: RwLock::new(location.into()),
            media: Mutex::new(Vec::new()),
            next_media_id: AtomicU64::new(1),
            mutation_tx: Mutex::new(None),
        }
    }

    /// Start reporting DOM changes on a new feed
    ///
    /// Replaces any previous feed. Events are dropped while the feed is full.
    pub fn observe(&self, capacity: usize) -> mpsc::Receiver<MutationEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        *self.mutation_tx.lock() = Some(tx);
        rx
    }

    /// Insert a new media element and report the mutation
    pub fn insert_media(&self) -> Arc<SimMedia> {
        let id = self.next_media_id.fetch_add(1, Ordering::Relaxed);
        let media = Arc::new(SimMedia::new(id));
        self.media.lock().push(Arc::clone(&media));
        self.emit(MutationEvent::added(1));
        media
    }

    /// Remove a media element and report the mutation
    pub fn remove_media(&self, id: ElementId) -> bool {
        let removed = {
            let mut media = self.media.lock();
            let before = media.len();
            media.retain(|m| m.id != id);
            media.len() != before
        };
        if removed {
            self.emit(MutationEvent::removed(1));
        }
        removed
    }

    /// Client-side navigation: change the location and swap some content
    pub fn navigate(&self, location: impl Into<String>) {
        *self.location.write() = location.into();
        self.emit(MutationEvent {
            added: 1,
            removed: 1,
        });
    }

    /// Report a DOM change that does not touch media
    pub fn touch(&self) {
        self.emit(MutationEvent::added(1));
    }

    /// Media elements currently in the document
    pub fn media(&self) -> Vec<Arc<SimMedia>> {
        self.media.lock().clone()
    }

    fn emit(&self, event: MutationEvent) {
        if let Some(tx) = self.mutation_tx.lock().as_ref() {
            if tx.try_send(event).is_err() {
                tracing::trace!("Mutation feed full or closed, event dropped");
            }
        }
    }
}

impl Document for SimDocument {
    fn location(&self) -> String {
        self.location.read().clone()
    }

    fn media_elements(&self) -> Vec<Arc<dyn MediaElement>> {
        self.media
            .lock()
            .iter()
            .map(|m| Arc::clone(m) as Arc<dyn MediaElement>)
            .collect()
    }
}

/// A mounted overlay node
#[derive(Debug, Clone)]
pub struct MountedOverlay {
    /// Node id
    pub id: OverlayId,
    /// Rendered text
    pub text: String,
    /// Inline CSS the node was created with
    pub css: String,
}

/// Simulated document body that overlays are mounted into
#[derive(Debug, Default)]
pub struct SimOverlaySurface {
    next_id: AtomicU64,
    mounted: Mutex<Vec<MountedOverlay>>,
    history: Mutex<Vec<String>>,
}

impl SimOverlaySurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays currently attached
    pub fn mounted(&self) -> Vec<MountedOverlay> {
        self.mounted.lock().clone()
    }

    /// Text of every overlay ever mounted, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl OverlaySurface for SimOverlaySurface {
    fn mount(&self, text: &str, style: &OverlayStyle) -> OverlayId {
        let id = OverlayId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.mounted.lock().push(MountedOverlay {
            id,
            text: text.to_string(),
            css: style.to_css(),
        });
        self.history.lock().push(text.to_string());
        id
    }

    fn unmount(&self, id: OverlayId) {
        self.mounted.lock().retain(|o| o.id != id);
    }

    fn is_mounted(&self, id: OverlayId) -> bool {
        self.mounted.lock().iter().any(|o| o.id == id)
    }
}
