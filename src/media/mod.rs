//! Media discovery and rate enforcement
//!
//! [`MediaRegistry`] applies a speed to every media element in the document
//! and instruments each element, once, with a `playing` listener that puts
//! the rate back when a site's own player resets it.

pub mod registry;

pub use registry::{enforce_rate, MediaRegistry};
