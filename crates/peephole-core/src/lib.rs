//! peephole-core: media model, URL extraction, classification, and the
//! channel selector.
//!
//! This crate is the foundational dependency for the other peephole crates.
//! It has no I/O beyond reading a config file: posts arrive through the
//! [`PostSource`] trait and leave as rendered [`MediaItem`]s.

pub mod channel;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use channel::{Channel, PostSource};
pub use classify::Classifier;
pub use error::{Error, Result};
pub use ids::*;
pub use media::*;
