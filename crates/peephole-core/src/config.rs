//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub channel: ChannelConfig,
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file, failing if it is missing or invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.channel.window_days <= 0 {
            warnings.push(format!(
                "channel.window_days is {}; the window only covers the current instant",
                self.channel.window_days
            ));
        }

        if self.channel.window_days > MAX_WINDOW_DAYS {
            warnings.push(format!(
                "channel.window_days is {}, more than {MAX_WINDOW_DAYS}; the window will cover every post",
                self.channel.window_days
            ));
        }

        let c = &self.classifier;
        for (name, set) in [
            ("audio_extensions", &c.audio_extensions),
            ("video_extensions", &c.video_extensions),
            ("image_extensions", &c.image_extensions),
        ] {
            if set.is_empty() {
                warnings.push(format!("classifier.{name} is empty"));
            }
        }

        let audio: HashSet<String> = c.audio_extensions.iter().map(|e| normalize_extension(e)).collect();
        let video: HashSet<String> = c.video_extensions.iter().map(|e| normalize_extension(e)).collect();
        for ext in c.image_extensions.iter().map(|e| normalize_extension(e)) {
            if audio.contains(&ext) || video.contains(&ext) {
                warnings.push(format!(
                    "extension '{ext}' is listed more than once; the earlier rule wins"
                ));
            }
        }
        for ext in &video {
            if audio.contains(ext) {
                warnings.push(format!(
                    "extension '{ext}' is listed more than once; the earlier rule wins"
                ));
            }
        }

        if c.youtube_hosts.is_empty() && c.vimeo_hosts.is_empty() {
            warnings.push("no embed hosts configured; YouTube and Vimeo links will be dropped".into());
        }

        warnings
    }
}

/// Widest window half-width, in days, that `validate` accepts silently.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Lowercase an extension and strip any leading dot (`".JPG"` -> `"jpg"`).
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            db_path: PathBuf::from("./data/peephole.db"),
        }
    }
}

/// Which end of the programme is "on air".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// First item of the programme, i.e. from the least recently updated post.
    #[default]
    Earliest,
    /// Last item of the programme, i.e. from the most recently updated post.
    Latest,
}

/// Channel window and selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Half-width of the window around "now", in days.
    pub window_days: i64,
    pub selection: Selection,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            selection: Selection::Earliest,
        }
    }
}

/// Host and extension tables used to classify URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub youtube_hosts: Vec<String>,
    pub vimeo_hosts: Vec<String>,
    pub audio_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            youtube_hosts: strings(&["youtube.com", "youtube-nocookie.com"]),
            vimeo_hosts: strings(&["vimeo.com"]),
            audio_extensions: strings(&["mp3", "wav", "aiff", "ogg", "aac", "m4a"]),
            video_extensions: strings(&["mp4", "mov", "ogm", "mkv", "ogv", "avi"]),
            image_extensions: strings(&["png", "jpg", "gif", "jpeg"]),
        }
    }
}
