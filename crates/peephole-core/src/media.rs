//! Media model: the closed set of playable kinds and the items built from them.
//!
//! A [`MediaItem`] is constructed fresh for every request from post text and
//! is immutable afterwards. Each [`MediaKind`] knows how to render itself as
//! an HTML fragment.

use serde::Serialize;
use std::fmt;
use url::Url;

/// Text rendered when nothing playable was found in the active window.
pub const NOTHING_ON: &str = "...nothing's on right now";

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// Kind of a classified media item.
///
/// `Dummy` is the placeholder shown when the channel has nothing to air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    YouTube,
    Vimeo,
    Dummy,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::YouTube => write!(f, "youtube"),
            Self::Vimeo => write!(f, "vimeo"),
            Self::Dummy => write!(f, "dummy"),
        }
    }
}

// ---------------------------------------------------------------------------
// MediaItem
// ---------------------------------------------------------------------------

/// A single classified, renderable media resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    kind: MediaKind,
    url: Option<Url>,
}

impl MediaItem {
    /// Build a playable item. Passing [`MediaKind::Dummy`] yields the
    /// placeholder and discards the URL.
    pub fn new(kind: MediaKind, url: Url) -> Self {
        if kind == MediaKind::Dummy {
            return Self::dummy();
        }
        Self {
            kind,
            url: Some(url),
        }
    }

    /// The "nothing is on" placeholder.
    pub fn dummy() -> Self {
        Self {
            kind: MediaKind::Dummy,
            url: None,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn is_dummy(&self) -> bool {
        self.kind == MediaKind::Dummy
    }

    /// URL to place in the rendered markup.
    ///
    /// YouTube watch links are rewritten to their `/embed/` form; every other
    /// kind embeds its URL unchanged.
    pub fn embed_url(&self) -> Option<Url> {
        let url = self.url.as_ref()?;
        match self.kind {
            MediaKind::YouTube => Some(youtube_embed(url)),
            _ => Some(url.clone()),
        }
    }

    /// Render this item as an HTML fragment.
    pub fn render(&self) -> String {
        let Some(src) = self.embed_url() else {
            return NOTHING_ON.to_string();
        };
        let src = escape_attr(src.as_str());

        match self.kind {
            MediaKind::Image => format!("<img src='{src}'>"),
            MediaKind::Audio => format!("<audio src='{src}' controls></audio>"),
            MediaKind::Video => format!("<video src='{src}' controls></video>"),
            MediaKind::YouTube => format!(
                "<iframe width=\"560\" height=\"315\" src=\"{src}\" \
                 frameborder=\"0\" allow=\"autoplay; encrypted-media\" allowfullscreen></iframe>"
            ),
            MediaKind::Vimeo => format!("<iframe src='{src}'></iframe>"),
            MediaKind::Dummy => NOTHING_ON.to_string(),
        }
    }
}

/// Rewrite `/v/<id>` and `/watch?v=<id>` to `/embed/<id>`, keeping any other
/// query parameters.
fn youtube_embed(url: &Url) -> Url {
    let mut embed = url.clone();
    let path = url.path();

    if let Some(id) = path.strip_prefix("/v/") {
        embed.set_path(&format!("/embed/{id}"));
        return embed;
    }

    if path == "/watch" {
        let mut video_id = None;
        let mut rest: Vec<(String, String)> = Vec::new();
        for (key, value) in url.query_pairs() {
            if key == "v" && video_id.is_none() {
                video_id = Some(value.into_owned());
            } else {
                rest.push((key.into_owned(), value.into_owned()));
            }
        }

        if let Some(id) = video_id.filter(|id| !id.is_empty()) {
            embed.set_path(&format!("/embed/{id}"));
            if rest.is_empty() {
                embed.set_query(None);
            } else {
                embed.query_pairs_mut().clear().extend_pairs(rest.iter());
            }
        }
    }

    embed
}

/// Escape a value for use inside a quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
