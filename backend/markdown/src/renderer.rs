//! Block-level HTML rendering.
//!
//! One exhaustive match over [`Block`]; sub-renderers handle lists, tables,
//! code and inline text. Per-document state lives in a [`RenderContext`]
//! created for each call.

use crate::code_block::CodeBlockRenderer;
use crate::heading::{parse_heading, HeadingIds};
use crate::inline::InlineRenderer;
use crate::ir::{Block, ListItem, ListKind};
use crate::list::render_list;
use crate::table::render_table;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub max_list_depth: usize,
    pub heading_ids: bool,
}

/// State scoped to a single document render.
#[derive(Debug)]
pub struct RenderContext {
    options: RenderOptions,
    heading_ids: HeadingIds,
}

impl RenderContext {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            heading_ids: HeadingIds::new(),
        }
    }
}

pub struct Renderer;

impl Renderer {
    /// Render blocks in document order. The result is trimmed and, when not
    /// empty, ends with exactly one newline.
    pub fn to_html(blocks: &[Block], ctx: &mut RenderContext) -> String {
        let mut output = String::new();
        for block in blocks {
            output.push_str(&Self::render_block(block, ctx));
        }

        let trimmed = output.trim();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\n")
        }
    }

    fn render_block(block: &Block, ctx: &mut RenderContext) -> String {
        match block {
            Block::Heading { raw_line } => Self::heading(raw_line, ctx),
            Block::Paragraph { lines } => Self::paragraph(&Block::joined_text(lines)),
            Block::CodeBlock { code, language } => CodeBlockRenderer::render(code, language.as_deref()),
            Block::HorizontalRule => "<hr>\n".to_string(),
            Block::Blockquote { lines } => Self::blockquote(lines),
            Block::UnorderedList { items } => Self::list(ListKind::Unordered, items, ctx),
            Block::OrderedList { items } => Self::list(ListKind::Ordered, items, ctx),
            Block::Table { rows } => render_table(rows),
        }
    }

    fn heading(raw_line: &str, ctx: &mut RenderContext) -> String {
        let (level, text) = parse_heading(raw_line);
        let body = InlineRenderer::render(text);
        if ctx.options.heading_ids {
            let id = ctx.heading_ids.allocate(text);
            format!("<h{level} id=\"{id}\">{body}</h{level}>\n")
        } else {
            format!("<h{level}>{body}</h{level}>\n")
        }
    }

    fn paragraph(text: &str) -> String {
        format!("<p>{}</p>\n", InlineRenderer::render(text))
    }

    fn list(kind: ListKind, items: &[ListItem], ctx: &RenderContext) -> String {
        render_list(kind, items, ctx.options.max_list_depth)
    }

    /// Strip `>` markers; blank quoted lines separate paragraphs.
    fn blockquote(lines: &[String]) -> String {
        let mut html = String::from("<blockquote>\n");
        let mut para: Vec<String> = Vec::new();
        for line in lines {
            let inner = line.trim_start();
            let inner = inner.strip_prefix('>').unwrap_or(inner);
            let inner = inner.strip_prefix(' ').unwrap_or(inner);
            if inner.trim().is_empty() {
                if !para.is_empty() {
                    html.push_str(&Self::paragraph(&Block::joined_text(&para)));
                    para.clear();
                }
            } else {
                para.push(inner.to_string());
            }
        }
        if !para.is_empty() {
            html.push_str(&Self::paragraph(&Block::joined_text(&para)));
        }
        html.push_str("</blockquote>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::segment;

    fn render(text: &str) -> String {
        let mut ctx = RenderContext::new(RenderOptions {
            max_list_depth: 32,
            heading_ids: true,
        });
        Renderer::to_html(&segment(text), &mut ctx)
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            render("# Hi\n\nHello **world**"),
            "<h1 id=\"hi\">Hi</h1>\n<p>Hello <strong>world</strong></p>\n"
        );
    }

    #[test]
    fn test_heading_ids_can_be_disabled() {
        let mut ctx = RenderContext::new(RenderOptions {
            max_list_depth: 32,
            heading_ids: false,
        });
        assert_eq!(Renderer::to_html(&segment("## Sub"), &mut ctx), "<h2>Sub</h2>\n");
    }

    #[test]
    fn test_duplicate_headings_within_document() {
        let html = render("# Intro\n# Intro\n## Intro");
        assert!(html.contains("<h1 id=\"intro\">"));
        assert!(html.contains("<h1 id=\"intro-1\">"));
        assert!(html.contains("<h2 id=\"intro-2\">"));
    }

    #[test]
    fn test_blockquote_paragraphs() {
        assert_eq!(
            render("> one\n>two\n>\n> **three**"),
            "<blockquote>\n<p>one two</p>\n<p><strong>three</strong></p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_horizontal_rule_and_code() {
        assert_eq!(
            render("---\n```sh\necho <hi>\n```"),
            "<hr>\n<pre><code class=\"language-sh\">echo &lt;hi&gt;</code></pre>\n"
        );
    }

    #[test]
    fn test_multiline_paragraph_is_joined() {
        assert_eq!(render("one\n  two  \nthree"), "<p>one two three</p>\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n"), "");
    }
}
