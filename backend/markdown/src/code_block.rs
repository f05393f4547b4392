//! Fenced Code Block Rendering
//!
//! Code is emitted verbatim (HTML-escaped); the fence's info string becomes a
//! `language-*` class when it is a plausible language name.

use crate::inline::escape_html;

pub struct CodeBlockRenderer;

impl CodeBlockRenderer {
    pub fn render(code: &str, language: Option<&str>) -> String {
        let class = language
            .and_then(Self::language_class)
            .map(|lang| format!(r#" class="language-{lang}""#))
            .unwrap_or_default();
        format!("<pre><code{class}>{}</code></pre>\n", escape_html(code))
    }

    /// Keep only characters that are safe and meaningful in a class name.
    fn language_class(language: &str) -> Option<String> {
        let lang: String = language
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '#' | '.' | '-'))
            .collect();
        (!lang.is_empty()).then_some(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_language() {
        assert_eq!(
            CodeBlockRenderer::render("fn main() {}", Some("rust")),
            "<pre><code class=\"language-rust\">fn main() {}</code></pre>\n"
        );
    }

    #[test]
    fn test_render_without_language_escapes_code() {
        assert_eq!(
            CodeBlockRenderer::render("<b>\n  & **x**", None),
            "<pre><code>&lt;b&gt;\n  &amp; **x**</code></pre>\n"
        );
    }

    #[test]
    fn test_language_is_sanitized() {
        let html = CodeBlockRenderer::render("x", Some("c++\"><script>"));
        assert!(html.starts_with("<pre><code class=\"language-c++script\">"));
        assert_eq!(CodeBlockRenderer::render("x", Some("{}")), "<pre><code>x</code></pre>\n");
    }
}
