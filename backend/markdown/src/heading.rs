//! Heading parsing and anchor id allocation.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap());

const FALLBACK_ID: &str = "heading";

/// Split a raw heading line into its level and text.
///
/// An optional closing run of `#` is dropped.
pub fn parse_heading(raw_line: &str) -> (usize, &str) {
    let line = raw_line.trim_start();
    let level = line.chars().take_while(|&c| c == '#').count().clamp(1, 6);
    let text = line[level..].trim();
    let text = match text.trim_end_matches('#') {
        stripped if stripped.len() == text.len() => text,
        // "# #" keeps nothing; "# C#" keeps its hash because it is glued to a word.
        stripped if stripped.is_empty() || stripped.ends_with(char::is_whitespace) => stripped.trim_end(),
        _ => text,
    };
    (level, text)
}

/// Turn heading text into a URL-safe slug.
pub fn slugify(text: &str) -> String {
    let text = LINK_TEXT_RE.replace_all(text, "$1");
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`' | '~'))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

/// Ids handed out so far within one document.
#[derive(Debug, Default)]
pub struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a unique id for the heading text, suffixing `-1`, `-2`, ... on collision.
    pub fn allocate(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = FALLBACK_ID.to_string();
        }

        let mut id = base.clone();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }
}
