//! Line-ending normalization and front-matter stripping.

use once_cell::sync::Lazy;
use regex::Regex;

static FRONT_MATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*\n").unwrap());

/// Normalize `\r\n` and `\r` to `\n` and drop a leading front-matter block.
///
/// The front-matter body is discarded, not decoded.
pub fn preprocess(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    match FRONT_MATTER_RE.find(&normalized) {
        Some(m) => normalized[m.end()..].to_string(),
        None => normalized,
    }
}
