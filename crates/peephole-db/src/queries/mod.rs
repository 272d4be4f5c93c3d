//! Database query modules.

pub mod posts;
