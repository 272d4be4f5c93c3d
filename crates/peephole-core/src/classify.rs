//! Media classification for extracted URLs.
//!
//! Rules are evaluated in a fixed priority order and the first match wins:
//!
//! 1. YouTube host
//! 2. Vimeo host
//! 3. audio extension
//! 4. video extension
//! 5. image extension
//!
//! Host rules come first because embed links carry no file extension.
//! A URL matching nothing is dropped.

use std::collections::HashSet;

use url::Url;

use crate::config::{normalize_extension, ClassifierConfig};
use crate::extract;
use crate::media::{MediaItem, MediaKind};

/// Stateless URL classifier built from injected host and extension tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    youtube_hosts: Vec<String>,
    vimeo_hosts: Vec<String>,
    audio: HashSet<String>,
    video: HashSet<String>,
    image: HashSet<String>,
}

impl Classifier {
    /// Build a classifier, normalizing hosts and extensions to lowercase.
    pub fn new(config: &ClassifierConfig) -> Self {
        let hosts = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect()
        };
        let exts = |list: &[String]| -> HashSet<String> {
            list.iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect()
        };

        Self {
            youtube_hosts: hosts(&config.youtube_hosts),
            vimeo_hosts: hosts(&config.vimeo_hosts),
            audio: exts(&config.audio_extensions),
            video: exts(&config.video_extensions),
            image: exts(&config.image_extensions),
        }
    }

    /// Decide the media kind of `url`, or `None` if it is not media.
    pub fn kind_of(&self, url: &Url) -> Option<MediaKind> {
        if let Some(host) = url.host_str() {
            let host = host.to_ascii_lowercase();
            if host_matches(&host, &self.youtube_hosts) {
                return Some(MediaKind::YouTube);
            }
            if host_matches(&host, &self.vimeo_hosts) {
                return Some(MediaKind::Vimeo);
            }
        }

        let ext = path_extension(url.path())?;
        if self.audio.contains(&ext) {
            Some(MediaKind::Audio)
        } else if self.video.contains(&ext) {
            Some(MediaKind::Video)
        } else if self.image.contains(&ext) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Classify a parsed URL into a [`MediaItem`].
    pub fn classify(&self, url: Url) -> Option<MediaItem> {
        let kind = self.kind_of(&url)?;
        Some(MediaItem::new(kind, url))
    }

    /// Extract and classify every media URL in one post, in text order.
    pub fn classify_text(&self, text: &str) -> Vec<MediaItem> {
        extract::extract_media_urls(text)
            .into_iter()
            .filter_map(|url| self.classify(url))
            .collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

/// True if `host` is one of `domains` or a subdomain of one.
fn host_matches(host: &str, domains: &[String]) -> bool {
    domains.iter().any(|d| {
        host == d
            || host
                .strip_suffix(d.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Lowercased extension of the last path segment, without the dot.
///
/// A dotfile such as `/.profile` has no extension.
fn path_extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(name[dot + 1..].to_ascii_lowercase())
}
