//! Advisory Markdown linter.
//!
//! Reports structural problems as human-readable strings; never fails.

use once_cell::sync::Lazy;
use regex::Regex;

static DEEP_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#{7,})").unwrap());
static EMPTY_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(\s*\)").unwrap());

const FENCE: &str = "```";

/// Scan a document and return warnings with 1-based line numbers.
pub fn validate(markdown: &str) -> Vec<String> {
    let text = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let mut warnings = Vec::new();
    let mut open_fence: Option<usize> = None;

    for (idx, line) in text.split('\n').enumerate() {
        let line_no = idx + 1;

        if line.trim().starts_with(FENCE) {
            open_fence = match open_fence {
                Some(_) => None,
                None => Some(line_no),
            };
            continue;
        }
        if open_fence.is_some() {
            continue;
        }

        if let Some(caps) = DEEP_HEADING_RE.captures(line) {
            warnings.push(format!(
                "Line {line_no}: Heading level {} exceeds the maximum of 6",
                caps[1].len()
            ));
        }
        for caps in EMPTY_LINK_RE.captures_iter(line) {
            // `![alt]()` is an image, reported the same way.
            warnings.push(format!("Line {line_no}: Link \"{}\" has an empty URL", &caps[1]));
        }
    }

    if let Some(line_no) = open_fence {
        warnings.push(format!("Line {line_no}: Code block is never closed"));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_document_has_no_warnings() {
        assert!(validate("# Title\n\nSome [link](https://a.b) and text.").is_empty());
        assert!(validate("").is_empty());
    }

    #[test]
    fn test_too_many_heading_levels() {
        let warnings = validate("# ok\n\n####### too deep");
        assert_eq!(warnings, vec!["Line 3: Heading level 7 exceeds the maximum of 6"]);
    }

    #[test]
    fn test_empty_link_urls() {
        let warnings = validate("fine\n[click]() and [here]( )");
        assert_eq!(
            warnings,
            vec![
                "Line 2: Link \"click\" has an empty URL",
                "Line 2: Link \"here\" has an empty URL",
            ]
        );
    }

    #[test]
    fn test_fenced_code_is_exempt() {
        let warnings = validate("```\n####### not a heading\n[x]()\n```\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unclosed_fence_reported() {
        let warnings = validate("text\n```rust\nfn main() {}");
        assert_eq!(warnings, vec!["Line 2: Code block is never closed"]);
    }

    #[test]
    fn test_line_numbers_with_crlf() {
        let warnings = validate("a\r\nb\r\n[x]()");
        assert_eq!(warnings, vec!["Line 3: Link \"x\" has an empty URL"]);
    }
}
