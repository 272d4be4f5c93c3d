//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a config and the
//! full [`AppContext`]. The [`TestHarness::with_server`] constructor starts
//! Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use chrono::{DateTime, TimeZone, Utc};

use peephole_core::config::Config;
use peephole_db::models::Post;
use peephole_db::pool::{init_memory_pool, DbPool};
use peephole_server::context::AppContext;
use peephole_server::router::build_router;

/// Fixed "now" used by the tests through the `at` query parameter.
pub const AT: &str = "2024-06-15T12:00:00Z";

pub fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Test harness wrapping an [`AppContext`] backed by an in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), &config);
        Self { ctx, db }
    }

    /// Start an Axum server on a random port.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn conn(&self) -> peephole_db::pool::PooledConnection {
        peephole_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert a post last updated at `updated_at`.
    pub fn add_post(&self, raw: &str, updated_at: DateTime<Utc>) -> Post {
        peephole_db::queries::posts::create_post(&self.conn(), raw, updated_at, None)
            .expect("failed to create post")
    }
}
