//! Inline span rendering.
//!
//! Stages run in a fixed order. Each stage swaps what it resolves for an
//! opaque placeholder token, so no later stage can re-read it:
//!
//! 1. backslash escapes
//! 2. code spans
//! 3. images
//! 4. links
//! 5. HTML escaping of everything left
//! 6. strong / emphasis / strikethrough / bare URLs
//! 7. restore HTML placeholders
//! 8. restore escaped characters

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use uuid::Uuid;

static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([\\`*_{}\[\]()#+\-.!|~])").unwrap());
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(\s*([^\s)]*)(?:\s+"([^"]*)")?\s*\)"#).unwrap()
});
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[([^\]]+)\]\(\s*([^\s)]*)(?:\s+"([^"]*)")?\s*\)"#).unwrap()
});
static STRONG_EM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*\*([^*\n]+)\*\*\*").unwrap());
static STRONG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static EM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static DEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(/?)(strong|em|del)>").unwrap());
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x{E000}([0-9a-f]+):(\d+)\x{E001}").unwrap());
static AUTOLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\w(\[=/])(https?://[^\s<>\x{E000}\x{E001}]+)").unwrap()
});

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// Entities produced by HTML escaping that end a bare URL.
const URL_STOPS: &[&str] = &["&lt;", "&gt;", "&quot;", "&#039;"];

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[derive(Debug)]
enum Fragment {
    Literal(char),
    Html(String),
}

/// Resolved fragments for a single inline render.
///
/// Tokens carry a per-registry nonce so text from the document can never
/// collide with one. The index inside a token is its arena slot.
struct PlaceholderRegistry {
    nonce: String,
    arena: Vec<Fragment>,
}

impl PlaceholderRegistry {
    fn new() -> Self {
        Self {
            nonce: Uuid::new_v4().simple().to_string(),
            arena: Vec::new(),
        }
    }

    fn token_for(&self, idx: usize) -> String {
        format!("{TOKEN_OPEN}{}:{idx}{TOKEN_CLOSE}", self.nonce)
    }

    fn insert(&mut self, fragment: Fragment) -> String {
        let idx = self.arena.len();
        self.arena.push(fragment);
        self.token_for(idx)
    }

    fn protect(&mut self, html: String) -> String {
        self.insert(Fragment::Html(html))
    }

    fn resolve(&self, caps: &Captures) -> Option<&Fragment> {
        if caps[1] != *self.nonce {
            return None;
        }
        caps[2].parse::<usize>().ok().and_then(|idx| self.arena.get(idx))
    }

    /// Swap placeholders back in. HTML fragments can embed older tokens (a
    /// link label holding a code span), so HTML passes repeat until none is
    /// left; escaped characters go in last, in one pass.
    fn restore(&self, mut text: String) -> String {
        if self.arena.is_empty() {
            return text;
        }
        for _ in 0..=self.arena.len() {
            let mut replaced = false;
            let next = TOKEN_RE.replace_all(&text, |caps: &Captures| match self.resolve(caps) {
                Some(Fragment::Html(html)) => {
                    replaced = true;
                    html.clone()
                }
                _ => caps[0].to_string(),
            });
            if !replaced {
                break;
            }
            text = next.into_owned();
        }
        TOKEN_RE
            .replace_all(&text, |caps: &Captures| match self.resolve(caps) {
                Some(Fragment::Literal(c)) => c.to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

pub struct InlineRenderer;

impl InlineRenderer {
    /// Render one block's inline text to HTML.
    pub fn render(text: &str) -> String {
        let mut registry = PlaceholderRegistry::new();

        let text = ESCAPE_RE.replace_all(text, |caps: &Captures| {
            let c = caps[1].chars().next().unwrap_or('\\');
            registry.insert(Fragment::Literal(c))
        });

        let text = CODE_RE.replace_all(&text, |caps: &Captures| {
            registry.protect(format!("<code>{}</code>", escape_html(&caps[1])))
        });

        let text = IMAGE_RE.replace_all(&text, |caps: &Captures| {
            let mut img = format!(
                r#"<img src="{}" alt="{}""#,
                escape_html(&caps[2]),
                escape_html(&caps[1])
            );
            if let Some(title) = caps.get(3) {
                img.push_str(&format!(r#" title="{}""#, escape_html(title.as_str())));
            }
            img.push('>');
            registry.protect(img)
        });

        let text = LINK_RE.replace_all(&text, |caps: &Captures| {
            let mut anchor = format!(r#"<a href="{}""#, escape_html(&caps[2]));
            if let Some(title) = caps.get(3) {
                anchor.push_str(&format!(r#" title="{}""#, escape_html(title.as_str())));
            }
            let label = apply_emphasis(&escape_html(&caps[1]));
            anchor.push_str(&format!(">{label}</a>"));
            registry.protect(anchor)
        });

        let text = escape_html(&text);
        let text = apply_emphasis(&text);
        let text = autolink(&text);

        registry.restore(text.into_owned())
    }
}

fn apply_emphasis(text: &str) -> String {
    let text = wrap_balanced(&STRONG_EM_RE, text, "<strong><em>", "</em></strong>");
    let text = wrap_balanced(&STRONG_RE, &text, "<strong>", "</strong>");
    let text = wrap_balanced(&EM_RE, &text, "<em>", "</em>");
    wrap_balanced(&DEL_RE, &text, "<del>", "</del>")
}

/// Wrap each match of `re` in `open`/`close`, unless its content would cut
/// through a tag an earlier pass emitted. Such matches stay literal.
fn wrap_balanced(re: &Regex, text: &str, open: &str, close: &str) -> String {
    re.replace_all(text, |caps: &Captures| {
        if tags_balanced(&caps[1]) {
            format!("{open}{}{close}", &caps[1])
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

fn tags_balanced(fragment: &str) -> bool {
    let mut open: Vec<&str> = Vec::new();
    for caps in TAG_RE.captures_iter(fragment) {
        let name = caps.get(2).map_or("", |m| m.as_str());
        if caps[1].is_empty() {
            open.push(name);
        } else if open.pop() != Some(name) {
            return false;
        }
    }
    open.is_empty()
}

fn autolink(text: &str) -> Cow<'_, str> {
    AUTOLINK_RE.replace_all(text, |caps: &Captures| {
        let (url, rest) = split_url_tail(&caps[2]);
        format!(r#"{}<a href="{url}">{url}</a>{rest}"#, &caps[1])
    })
}

/// Split a matched URL into the linkable part and trailing text that stays outside the anchor.
fn split_url_tail(candidate: &str) -> (&str, &str) {
    let mut end = URL_STOPS
        .iter()
        .filter_map(|stop| candidate.find(stop))
        .min()
        .unwrap_or(candidate.len());

    let url = &candidate[..end];
    let keep_paren = url.contains('(');
    let trimmed = url.trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '!' | '?') || (c == ')' && !keep_paren)
    });
    end = trimmed.len();
    (&candidate[..end], &candidate[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        InlineRenderer::render(text)
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(render(r#"a < b & "c" 'd'"#), "a &lt; b &amp; &quot;c&quot; &#039;d&#039;");
        assert_eq!(render("<script>alert(1)</script>"), "&lt;script&gt;alert(1)&lt;/script&gt;");
    }

    #[test]
    fn test_strong_em_and_del() {
        assert_eq!(render("Hello **world**"), "Hello <strong>world</strong>");
        assert_eq!(render("an *em* word"), "an <em>em</em> word");
        assert_eq!(render("~~gone~~"), "<del>gone</del>");
        assert_eq!(render("**bold *inner* bold**"), "<strong>bold <em>inner</em> bold</strong>");
        assert_eq!(render("*an **inner** strong*"), "<em>an <strong>inner</strong> strong</em>");
    }

    #[test]
    fn test_triple_star_is_strong_em() {
        assert_eq!(render("***x***"), "<strong><em>x</em></strong>");
        assert_eq!(render("a ***b c*** d"), "a <strong><em>b c</em></strong> d");
    }

    #[test]
    fn test_overlapping_markers_stay_well_nested() {
        assert_eq!(render("**a *b** c*"), "<strong>a *b</strong> c*");
        assert_eq!(render("*a **b* c**"), "*a <strong>b* c</strong>");
        assert_eq!(render("~~a **b~~ c**"), "~~a <strong>b~~ c</strong>");
    }

    #[test]
    fn test_many_escapes_restore_in_linear_time() {
        let text = r"\*".repeat(50_000);
        let started = std::time::Instant::now();
        assert_eq!(render(&text), "*".repeat(50_000));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_many_code_spans_restore() {
        let text = "`c` ".repeat(10_000);
        let html = render(text.trim_end());
        assert_eq!(html.matches("<code>c</code>").count(), 10_000);
        assert!(!html.contains(TOKEN_OPEN));
    }

    #[test]
    fn test_nested_fragments_restore() {
        assert_eq!(
            render(r"[![a \*](i.png) `b`](/)"),
            r#"<a href="/"><img src="i.png" alt="a *"> <code>b</code></a>"#
        );
    }

    #[test]
    fn test_escaped_stars_are_literal() {
        assert_eq!(render(r"\*not emphasis\*"), "*not emphasis*");
        assert_eq!(render(r"\*\*not strong\*\*"), "**not strong**");
        assert_eq!(render(r"a \\ b"), r"a \ b");
    }

    #[test]
    fn test_code_span_is_opaque() {
        assert_eq!(render("`[not a link](x)`"), "<code>[not a link](x)</code>");
        assert_eq!(render("`**x** <y>`"), "<code>**x** &lt;y&gt;</code>");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            render("see [docs](https://example.com/a?b=1&c=2)"),
            r#"see <a href="https://example.com/a?b=1&amp;c=2">docs</a>"#
        );
        assert_eq!(
            render(r#"[home](/ "Go <home>")"#),
            r#"<a href="/" title="Go &lt;home&gt;">home</a>"#
        );
        assert_eq!(
            render("[**bold** & <b>](u)"),
            r#"<a href="u"><strong>bold</strong> &amp; &lt;b&gt;</a>"#
        );
    }

    #[test]
    fn test_link_text_with_code_span() {
        assert_eq!(render("[`cfg`](u)"), r#"<a href="u"><code>cfg</code></a>"#);
    }

    #[test]
    fn test_images() {
        assert_eq!(
            render(r#"![a "cat"](cat.png "Cat")"#),
            r#"<img src="cat.png" alt="a &quot;cat&quot;" title="Cat">"#
        );
        assert_eq!(render("![](x.png)"), r#"<img src="x.png" alt="">"#);
        assert_eq!(
            render("[![logo](l.png)](/)"),
            r#"<a href="/"><img src="l.png" alt="logo"></a>"#
        );
    }

    #[test]
    fn test_empty_link_url_still_renders() {
        assert_eq!(render("[text]()"), r#"<a href="">text</a>"#);
    }

    #[test]
    fn test_autolinks() {
        assert_eq!(
            render("visit https://example.com/x."),
            r#"visit <a href="https://example.com/x">https://example.com/x</a>."#
        );
        assert_eq!(
            render("<http://a.b/c>"),
            r#"&lt;<a href="http://a.b/c">http://a.b/c</a>&gt;"#
        );
        assert_eq!(
            render("(see http://a.b)"),
            r#"(see <a href="http://a.b">http://a.b</a>)"#
        );
    }

    #[test]
    fn test_link_url_is_not_autolinked_twice() {
        assert_eq!(
            render("[https://a.b](https://a.b)"),
            r#"<a href="https://a.b">https://a.b</a>"#
        );
    }

    #[test]
    fn test_forged_placeholder_text_passes_through() {
        let forged = format!("{TOKEN_OPEN}deadbeef:0{TOKEN_CLOSE}");
        assert_eq!(render(&format!("`x` {forged}")), format!("<code>x</code> {forged}"));
    }

    #[test]
    fn test_deterministic_output() {
        let text = r"**a** `b` [c](d) \* https://e.f";
        assert_eq!(render(text), render(text));
    }

    #[test]
    fn test_escape_html_borrows_clean_input() {
        assert!(matches!(escape_html("clean"), Cow::Borrowed(_)));
        assert_eq!(escape_html("a&b"), "a&amp;b");
    }
}
