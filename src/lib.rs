//! Per-site media playback speed control
//!
//! This crate implements the logic of a browser content script that lets a
//! user speed up or slow down every `<video>`/`<audio>` element on a page,
//! remembers the chosen speed per site, and can be switched off per site.
//!
//! # Components
//!
//! ```text
//!   UI peer ──► MessageEndpoint ─┐
//!                                ├──► SpeedController ──► MediaRegistry (rates)
//!   DOM ──► ChangeWatcher ───────┘          │        ──► Overlay (indicator)
//!                                           └────────► SpeedStorage (persist)
//! ```
//!
//! The browser itself is abstracted behind the [`page`] traits and the
//! storage backend behind [`storage::SiteStore`]. [`page::sim`] and
//! [`storage::MemoryStore`] provide an in-process page for tests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use media_speed::page::{SimDocument, SimOverlaySurface};
//! use media_speed::storage::JsonFileStore;
//! use media_speed::{ContentScript, ControllerConfig, Request};
//!
//! # async fn example() -> media_speed::Result<()> {
//! let document = Arc::new(SimDocument::new("https://www.youtube.com/watch?v=abc"));
//! let config = ControllerConfig::default();
//! let mutations = document.observe(config.mutation_queue_size);
//!
//! let script = ContentScript::start(
//!     config,
//!     document.clone(),
//!     Arc::new(JsonFileStore::new("speeds.json")),
//!     Arc::new(SimOverlaySurface::new()),
//!     mutations,
//! )
//! .await;
//!
//! let status = script.client().request(Request::IncreaseSpeed).await?;
//! assert_eq!(status.current_speed, 1.25);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod media;
pub mod overlay;
pub mod page;
pub mod site;
pub mod speed;
pub mod storage;
pub mod timer;
pub mod watcher;

pub use config::ControllerConfig;
pub use content::ContentScript;
pub use controller::{ControllerState, SpeedController, SpeedStatus};
pub use endpoint::{EndpointClient, MessageEndpoint, Request};
pub use error::{Error, Result};
pub use site::Site;
pub use watcher::{ChangeWatcher, MutationOutcome};
