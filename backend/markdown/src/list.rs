//! Nested list reconstruction.
//!
//! A list block arrives as a flat run of items with indent columns. The tree
//! is rebuilt with an explicit parent stack, so input nesting depth never
//! turns into call-stack depth while building. Rendering recurses over the
//! finished tree, whose depth is bounded by the level cap.

use tracing::warn;

use crate::inline::InlineRenderer;
use crate::ir::{ListItem, ListKind};

const INDENT_UNIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    pub content: String,
    pub level: usize,
    pub children: Vec<ListNode>,
}

/// Columns per nesting level for one list run.
///
/// Four, unless the run's smallest non-zero indent is narrower, in which case
/// that indent is the unit (two-space nested lists). The unit applies to the
/// whole run, so one narrow item rescales the levels of every other item.
fn indent_unit(items: &[ListItem]) -> usize {
    items
        .iter()
        .map(|item| item.indent)
        .filter(|&indent| indent > 0)
        .min()
        .map_or(INDENT_UNIT, |narrowest| narrowest.min(INDENT_UNIT))
}

/// Build a forest from a flat item run. Levels above `max_level` are clamped.
pub fn build_tree(items: &[ListItem], max_level: usize) -> Vec<ListNode> {
    let unit = indent_unit(items);
    let mut roots: Vec<ListNode> = Vec::new();
    // Open ancestors of the next item, outermost first.
    let mut stack: Vec<ListNode> = Vec::new();
    let mut clamped = 0usize;

    for item in items {
        let mut level = item.indent / unit;
        if level > max_level {
            level = max_level;
            clamped += 1;
        }

        while stack.last().is_some_and(|top| top.level >= level) {
            close_top(&mut stack, &mut roots);
        }
        stack.push(ListNode {
            content: item.content.clone(),
            level,
            children: Vec::new(),
        });
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    if clamped > 0 {
        warn!(clamped, max_level, "List nesting exceeds depth cap; items clamped");
    }
    roots
}

/// Pop the innermost open node and attach it to its parent, or to the roots.
fn close_top(stack: &mut Vec<ListNode>, roots: &mut Vec<ListNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

pub fn render_list(kind: ListKind, items: &[ListItem], max_level: usize) -> String {
    let tree = build_tree(items, max_level);
    let mut html = String::new();
    render_nodes(kind.tag(), &tree, &mut html);
    html
}

fn render_nodes(tag: &str, nodes: &[ListNode], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push_str(">\n");
    for node in nodes {
        out.push_str("<li>");
        out.push_str(&InlineRenderer::render(&node.content));
        if !node.children.is_empty() {
            out.push('\n');
            render_nodes(tag, &node.children, out);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}
