//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use peephole_core::PostId;
use rusqlite::types::Type;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Format a timestamp for storage.
///
/// Fixed precision and a `Z` suffix keep text comparison in SQLite
/// consistent with chronological order.
pub fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

static STORAGE_MIN: LazyLock<DateTime<Utc>> = LazyLock::new(|| {
    Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0)
        .single()
        .expect("year 0 is representable")
});

static STORAGE_MAX: LazyLock<DateTime<Utc>> = LazyLock::new(|| {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .expect("year 9999 is representable")
        + TimeDelta::microseconds(999_999)
});

/// Clamp a query bound to years 0000..=9999, the range [`format_ts`] writes
/// with a fixed-width year.
pub fn clamp_to_storage(at: DateTime<Utc>) -> DateTime<Utc> {
    at.clamp(*STORAGE_MIN, *STORAGE_MAX)
}

fn parse_id(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<PostId> {
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A forum post as stored: raw Markdown/HTML plus timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub raw: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            raw: row.get(1)?,
            created_at: parse_ts(row, 2)?,
            updated_at: parse_ts(row, 3)?,
        })
    }
}
