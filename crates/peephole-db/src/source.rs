//! [`PostSource`] backed by a SQLite connection.

use chrono::{DateTime, Utc};
use peephole_core::{PostSource, Result};
use rusqlite::Connection;

use crate::queries::posts;

/// Reads the channel window straight from the `posts` table.
pub struct SqlitePostSource<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePostSource<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PostSource for SqlitePostSource<'_> {
    fn posts_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        posts::list_raw_updated_between(self.conn, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::{Duration, TimeZone};
    use peephole_core::config::ChannelConfig;
    use peephole_core::{Channel, Classifier, MediaKind};

    #[test]
    fn channel_reads_from_store() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        posts::create_post(&conn, "old https://e.example/x.png", now, Some(now - Duration::days(30)))
            .unwrap();
        posts::create_post(&conn, "[song](https://e.example/tune.mp3)", now, Some(now - Duration::days(2)))
            .unwrap();
        posts::create_post(&conn, "https://www.youtube.com/watch?v=abc", now, Some(now)).unwrap();

        let source = SqlitePostSource::new(&conn);
        let item = Channel::default().now_playing(&source, now).unwrap();
        assert_eq!(item.kind(), MediaKind::Audio);

        let programme = Channel::default().programme(&source, now).unwrap();
        assert_eq!(programme.len(), 2);
    }

    #[test]
    fn wide_window_still_finds_posts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        posts::create_post(&conn, "https://e.example/tune.mp3", now, None).unwrap();

        let source = SqlitePostSource::new(&conn);
        for window_days in [3_000_000, 200_000_000, i64::MAX] {
            let config = ChannelConfig {
                window_days,
                ..ChannelConfig::default()
            };
            let channel = Channel::new(Classifier::default(), config);
            let item = channel.now_playing(&source, now).unwrap();
            assert_eq!(item.kind(), MediaKind::Audio, "window_days = {window_days}");
        }
    }

    #[test]
    fn empty_store_plays_dummy() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let source = SqlitePostSource::new(&conn);
        let item = Channel::default().now_playing(&source, Utc::now()).unwrap();
        assert!(item.is_dummy());
    }
}
