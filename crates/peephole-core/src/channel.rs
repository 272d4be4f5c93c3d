//! The channel: a single continuous broadcast simulated from discrete posts.
//!
//! Each call recomputes from the [`PostSource`]; nothing is cached between
//! requests.

use chrono::{DateTime, TimeDelta, Utc};

use crate::classify::Classifier;
use crate::config::{ChannelConfig, Selection};
use crate::error::Result;
use crate::media::MediaItem;

/// Read-only access to forum posts.
///
/// Implementations return the raw text of every post whose update time lies
/// in `[start, end]` (inclusive), ordered ascending by update time.
pub trait PostSource {
    fn posts_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>>;
}

/// Posts held in memory, already ordered by update time.
impl PostSource for Vec<(DateTime<Utc>, String)> {
    fn posts_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        Ok(self
            .iter()
            .filter(|(at, _)| *at >= start && *at <= end)
            .map(|(_, raw)| raw.clone())
            .collect())
    }
}

/// Computes what is "on air" at a given instant.
#[derive(Debug, Clone)]
pub struct Channel {
    classifier: Classifier,
    config: ChannelConfig,
}

impl Channel {
    pub fn new(classifier: Classifier, config: ChannelConfig) -> Self {
        Self { classifier, config }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The symmetric window `[now - window_days, now + window_days]`.
    ///
    /// Bounds saturate at the representable range instead of overflowing.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let half = TimeDelta::try_days(self.config.window_days.max(0)).unwrap_or(TimeDelta::MAX);
        let start = now
            .checked_sub_signed(half)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = now
            .checked_add_signed(half)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (start, end)
    }

    /// Every classified item in the window: post order, then URL order.
    pub fn programme(
        &self,
        source: &dyn PostSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<MediaItem>> {
        let (start, end) = self.window(now);
        let posts = source.posts_updated_between(start, end)?;
        tracing::debug!(
            posts = posts.len(),
            %start,
            %end,
            "building programme"
        );

        let items: Vec<MediaItem> = posts
            .iter()
            .flat_map(|raw| self.classifier.classify_text(raw))
            .collect();

        tracing::debug!(items = items.len(), "programme built");
        Ok(items)
    }

    /// The item currently airing, or the placeholder when nothing is on.
    pub fn now_playing(&self, source: &dyn PostSource, now: DateTime<Utc>) -> Result<MediaItem> {
        let programme = self.programme(source, now)?;
        Ok(pick(programme, self.config.selection))
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new(Classifier::default(), ChannelConfig::default())
    }
}

fn pick(programme: Vec<MediaItem>, selection: Selection) -> MediaItem {
    let chosen = match selection {
        Selection::Earliest => programme.into_iter().next(),
        Selection::Latest => programme.into_iter().last(),
    };
    chosen.unwrap_or_else(MediaItem::dummy)
}
