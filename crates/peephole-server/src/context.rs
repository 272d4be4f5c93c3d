//! Application context shared by all route handlers via Axum state.

use std::sync::Arc;

use peephole_core::config::Config;
use peephole_core::{Channel, Classifier};
use peephole_db::pool::DbPool;

/// Application context shared by all request handlers (via Axum state).
///
/// Cheap to clone: it only holds an `Arc` and the pool.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool for the post store.
    pub db: DbPool,
    /// Channel built from the classifier and channel sections of `config`.
    pub channel: Arc<Channel>,
}

impl AppContext {
    pub fn new(db: DbPool, config: &Config) -> Self {
        let classifier = Classifier::new(&config.classifier);
        let channel = Channel::new(classifier, config.channel.clone());
        Self {
            db,
            channel: Arc::new(channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peephole_core::config::Selection;

    #[test]
    fn channel_follows_config() {
        let mut config = Config::default();
        config.channel.window_days = 3;
        config.channel.selection = Selection::Latest;
        let db = peephole_db::pool::init_memory_pool().unwrap();

        let ctx = AppContext::new(db, &config);
        assert_eq!(ctx.channel.config().window_days, 3);
        assert_eq!(ctx.channel.config().selection, Selection::Latest);
    }
}
