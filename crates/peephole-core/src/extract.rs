//! URL extraction from raw post text.
//!
//! Posts are Markdown, plain text, or light HTML. Links are found either as
//! Markdown link targets (`[label](https://...)`) or as bare `http(s)://`
//! tokens. Extraction never invents URLs: every returned string appears
//! verbatim in the input.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Markdown link target or bare URL. Exactly one group participates per match.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[[^\]]*\]\((https?://[^"<\s]+)\)|(https?://[^"<\s]+)"#)
        .expect("URL pattern is valid")
});

/// Scan `text` for candidate URLs in first-occurrence order.
///
/// Duplicates are kept. Blank captures are skipped.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
        .collect()
}

/// Parse a candidate URL, retrying once with unsafe characters escaped.
///
/// Returns `None` when both attempts fail; the caller simply drops it.
/// `Url::parse` already percent-encodes path, query and fragment bytes, so
/// in practice only host and port errors reach the retry, and escaping does
/// not repair those.
pub fn parse_candidate(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(first) => {
            let escaped = escape_unsafe(raw);
            match Url::parse(&escaped) {
                Ok(url) => {
                    tracing::trace!(%raw, "parsed URL after escaping");
                    Some(url)
                }
                Err(second) => {
                    tracing::debug!(%raw, %first, %second, "dropping unparsable URL");
                    None
                }
            }
        }
    }
}

/// Extract and parse every URL in `text`, dropping the unparsable ones.
pub fn extract_media_urls(text: &str) -> Vec<Url> {
    extract_urls(text)
        .iter()
        .filter_map(|raw| parse_candidate(raw))
        .collect()
}

/// Percent-escape every byte outside the URI unreserved and reserved sets.
fn escape_unsafe(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')'
            | b';'
            | b'/'
            | b'?'
            | b':'
            | b'@'
            | b'&'
            | b'='
            | b'+'
            | b'$'
            | b','
            | b'['
            | b']' => out.push(b as char),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";
