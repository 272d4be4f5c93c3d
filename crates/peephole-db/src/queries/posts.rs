//! Post CRUD and window queries.

use chrono::{DateTime, Utc};
use peephole_core::{Error, PostId, Result};
use rusqlite::Connection;

use crate::models::{clamp_to_storage, format_ts, Post};

const COLS: &str = "id, raw, created_at, updated_at";

/// Insert a post. `updated_at` defaults to the creation time.
pub fn create_post(
    conn: &Connection,
    raw: &str,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
) -> Result<Post> {
    let id = PostId::new();
    let updated_at = updated_at.unwrap_or(created_at);

    conn.execute(
        "INSERT INTO posts (id, raw, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            id.to_string(),
            raw,
            format_ts(created_at),
            format_ts(updated_at),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    tracing::debug!(%id, "created post");

    // Re-read so the returned timestamps carry storage precision.
    get_post(conn, id)?.ok_or_else(|| Error::not_found("post", id))
}

/// Get a post by ID.
pub fn get_post(conn: &Connection, id: PostId) -> Result<Option<Post>> {
    let q = format!("SELECT {COLS} FROM posts WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], Post::from_row) {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Replace a post's text and bump its update time.
pub fn update_post_raw(
    conn: &Connection,
    id: PostId,
    raw: &str,
    updated_at: DateTime<Utc>,
) -> Result<Post> {
    let n = conn
        .execute(
            "UPDATE posts SET raw = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![raw, format_ts(updated_at), id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if n == 0 {
        return Err(Error::not_found("post", id));
    }
    get_post(conn, id)?.ok_or_else(|| Error::not_found("post", id))
}

/// Delete a post. Returns true if a row was removed.
pub fn delete_post(conn: &Connection, id: PostId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM posts WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// List posts with `start <= updated_at <= end`, oldest update first.
pub fn list_posts_updated_between(
    conn: &Connection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Post>> {
    let q = format!(
        "SELECT {COLS} FROM posts WHERE updated_at >= ?1 AND updated_at <= ?2 \
         ORDER BY updated_at ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![
                format_ts(clamp_to_storage(start)),
                format_ts(clamp_to_storage(end))
            ],
            Post::from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Same window as [`list_posts_updated_between`], raw text only.
pub fn list_raw_updated_between(
    conn: &Connection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT raw FROM posts WHERE updated_at >= ?1 AND updated_at <= ?2 \
             ORDER BY updated_at ASC, rowid ASC",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![
                format_ts(clamp_to_storage(start)),
                format_ts(clamp_to_storage(end))
            ],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Total number of stored posts.
pub fn count_posts(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::{Duration, TimeZone};

    fn setup() -> crate::pool::PooledConnection {
        let pool = init_memory_pool().unwrap();
        pool.get().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_and_get() {
        let conn = setup();
        let post = create_post(&conn, "hello https://e.example/a.png", t0(), None).unwrap();
        assert_eq!(post.updated_at, t0());
        assert_eq!(post.created_at, t0());

        let fetched = get_post(&conn, post.id).unwrap().unwrap();
        assert_eq!(fetched, post);
    }

    #[test]
    fn get_missing_is_none() {
        let conn = setup();
        assert!(get_post(&conn, PostId::new()).unwrap().is_none());
    }

    #[test]
    fn update_bumps_updated_at() {
        let conn = setup();
        let post = create_post(&conn, "v1", t0(), None).unwrap();
        let later = t0() + Duration::hours(2);
        let updated = update_post_raw(&conn, post.id, "v2", later).unwrap();
        assert_eq!(updated.raw, "v2");
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, t0());
    }

    #[test]
    fn update_missing_is_not_found() {
        let conn = setup();
        let err = update_post_raw(&conn, PostId::new(), "x", t0()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn delete() {
        let conn = setup();
        let post = create_post(&conn, "bye", t0(), None).unwrap();
        assert!(delete_post(&conn, post.id).unwrap());
        assert!(!delete_post(&conn, post.id).unwrap());
        assert_eq!(count_posts(&conn).unwrap(), 0);
    }

    #[test]
    fn window_is_inclusive_and_ascending() {
        let conn = setup();
        let start = t0() - Duration::days(14);
        let end = t0() + Duration::days(14);

        create_post(&conn, "late", t0(), Some(end)).unwrap();
        create_post(&conn, "middle", t0(), Some(t0())).unwrap();
        create_post(&conn, "early", t0(), Some(start)).unwrap();
        create_post(&conn, "before", t0(), Some(start - Duration::seconds(1))).unwrap();
        create_post(&conn, "after", t0(), Some(end + Duration::seconds(1))).unwrap();

        let posts = list_posts_updated_between(&conn, start, end).unwrap();
        let raws: Vec<&str> = posts.iter().map(|p| p.raw.as_str()).collect();
        assert_eq!(raws, vec!["early", "middle", "late"]);

        let raw_only = list_raw_updated_between(&conn, start, end).unwrap();
        assert_eq!(raw_only, vec!["early", "middle", "late"]);
    }

    #[test]
    fn unbounded_window_matches_everything() {
        let conn = setup();
        create_post(&conn, "now", t0(), None).unwrap();
        create_post(&conn, "ancient", t0(), Some(t0() - Duration::days(365 * 2000))).unwrap();

        let raws = list_raw_updated_between(
            &conn,
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
        )
        .unwrap();
        assert_eq!(raws, vec!["ancient", "now"]);

        let far_end = t0() + Duration::days(3_000_000);
        let posts = list_posts_updated_between(&conn, t0(), far_end).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].raw, "now");
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let conn = setup();
        create_post(&conn, "one", t0(), None).unwrap();
        create_post(&conn, "two", t0(), None).unwrap();
        let raws = list_raw_updated_between(&conn, t0(), t0()).unwrap();
        assert_eq!(raws, vec!["one", "two"]);
    }
}
