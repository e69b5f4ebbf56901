//! Speed controller
//!
//! The controller owns the page's speed state and is the only component that
//! mutates it. Every path ends in the same three side effects:
//!
//! ```text
//!   increase / decrease / reset ──► apply to media ──► overlay ──► persist speed
//!   load_for_site               ──► apply to media
//!   toggle_site_enablement      ──► apply to media ──► persist disabled set
//! ```
//!
//! State is published on a `tokio::sync::watch` channel. The media
//! enforcement listeners fire synchronously from media events and read the
//! latest value from their receiver without awaiting.

pub mod speed;
pub mod state;

pub use speed::SpeedController;
pub use state::{ControllerState, SpeedStatus};
