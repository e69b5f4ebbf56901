//! Media registry implementation

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::controller::ControllerState;
use crate::page::{Document, ElementId, MediaElement, PlayingListener};

/// Tracks which media elements carry the enforcement listener
///
/// The side table is keyed by [`ElementId`] alone. Hosts may hand out a new
/// wrapper for the same element on every query, so the wrapper's lifetime
/// says nothing about whether the element was already instrumented.
pub struct MediaRegistry {
    document: Arc<dyn Document>,
    instrumented: Mutex<HashSet<ElementId>>,
    state: watch::Receiver<ControllerState>,
}

impl MediaRegistry {
    /// Create a registry for `document`, enforcing the rate published on `state`
    pub fn new(document: Arc<dyn Document>, state: watch::Receiver<ControllerState>) -> Self {
        Self {
            document,
            instrumented: Mutex::new(HashSet::new()),
            state,
        }
    }

    /// Set `speed` on every media element and instrument new ones
    ///
    /// Returns the number of elements updated.
    pub fn apply_to_all(&self, speed: f64) -> usize {
        let elements = self.document.media_elements();
        let mut instrumented = self.instrumented.lock();

        for element in &elements {
            element.set_playback_rate(speed);

            let id = element.id();
            if instrumented.insert(id) {
                element.add_playing_listener(self.enforcement_listener());
                tracing::trace!(element = %id, "Enforcement listener attached");
            }
        }

        tracing::debug!(speed = speed, elements = elements.len(), "Speed applied");
        elements.len()
    }

    /// Check whether an element has been instrumented
    pub fn is_instrumented(&self, id: ElementId) -> bool {
        self.instrumented.lock().contains(&id)
    }

    /// Number of elements ever instrumented
    pub fn instrumented_count(&self) -> usize {
        self.instrumented.lock().len()
    }

    fn enforcement_listener(&self) -> PlayingListener {
        let state = self.state.clone();
        Arc::new(move |media: &dyn MediaElement| {
            enforce_rate(&state, media);
        })
    }
}

/// Correct a media element's rate if the controller is enabled and the rate
/// has drifted from the current speed
///
/// Returns `true` if the rate was rewritten.
pub fn enforce_rate(state: &watch::Receiver<ControllerState>, media: &dyn MediaElement) -> bool {
    let (enabled, speed) = {
        let state = state.borrow();
        (state.enabled_for_site, state.current_speed)
    };

    if !enabled || media.playback_rate() == speed {
        return false;
    }

    tracing::debug!(
        element = %media.id(),
        from = media.playback_rate(),
        to = speed,
        "Playback rate reset by page, correcting"
    );
    media.set_playback_rate(speed);
    true
}

impl std::fmt::Debug for MediaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaRegistry")
            .field("instrumented", &self.instrumented_count())
            .finish()
    }
}
