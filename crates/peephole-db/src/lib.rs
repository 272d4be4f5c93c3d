//! peephole-db: SQLite-backed post store.
//!
//! Provides connection pooling, embedded migrations, the `Post` model, and
//! the queries behind the [`peephole_core::PostSource`] implementation.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod source;

pub use source::SqlitePostSource;
