//! Page surface consumed by the controller
//!
//! The controller never touches a real DOM. A host binding implements these
//! traits over the browser's document, media elements and body; the
//! [`sim`] module provides an in-process page used by the tests and demo.

pub mod sim;

use std::sync::Arc;

use crate::overlay::OverlayStyle;

pub use sim::{SimDocument, SimMedia, SimOverlaySurface};

/// Identity of a media element within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "media#{}", self.0)
    }
}

/// Identity of a mounted overlay node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// Callback invoked when a media element starts playing
pub type PlayingListener = Arc<dyn Fn(&dyn MediaElement) + Send + Sync>;

/// A `<video>` or `<audio>` element
pub trait MediaElement: Send + Sync {
    /// Identity of the underlying element
    ///
    /// Every handle to the same element reports the same id, and ids are
    /// never reused for another element within the document.
    fn id(&self) -> ElementId;

    /// Current playback rate
    fn playback_rate(&self) -> f64;

    /// Set the playback rate
    fn set_playback_rate(&self, rate: f64);

    /// Register a listener for the element's `playing` event
    fn add_playing_listener(&self, listener: PlayingListener);
}

/// The document the controller is injected into
pub trait Document: Send + Sync {
    /// Full current location (`location.href`)
    fn location(&self) -> String;

    /// Every media element currently in the document
    ///
    /// Handles may be freshly created on each call.
    fn media_elements(&self) -> Vec<Arc<dyn MediaElement>>;
}

/// Where the speed overlay is drawn
pub trait OverlaySurface: Send + Sync {
    /// Insert a new overlay node showing `text`
    fn mount(&self, text: &str, style: &OverlayStyle) -> OverlayId;

    /// Remove an overlay node. Unknown ids are ignored.
    fn unmount(&self, id: OverlayId);

    /// Check whether an overlay node is still attached
    fn is_mounted(&self, id: OverlayId) -> bool;
}

/// A batch of child-list changes somewhere under the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationEvent {
    /// Nodes inserted
    pub added: usize,
    /// Nodes removed
    pub removed: usize,
}

impl MutationEvent {
    /// Mutation inserting `count` nodes
    pub fn added(count: usize) -> Self {
        Self {
            added: count,
            removed: 0,
        }
    }

    /// Mutation removing `count` nodes
    pub fn removed(count: usize) -> Self {
        Self {
            added: 0,
            removed: count,
        }
    }
}
