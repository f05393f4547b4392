//! Markdown Block Representation
//!
//! Segments a normalized document into an ordered sequence of typed blocks.
//! Inline markup is left untouched here; it is resolved per block at render time.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-{3,}|\*{3,}|_{3,})$").unwrap());
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([*\-+]|\d+\.)\s+(.+)$").unwrap());
static ORDERED_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\s").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+").unwrap());

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// One line of a list run, before nesting is reconstructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListItem {
    pub content: String,
    /// Leading whitespace columns; a tab counts as one column.
    pub indent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { raw_line: String },
    Paragraph { lines: Vec<String> },
    CodeBlock { code: String, language: Option<String> },
    HorizontalRule,
    Blockquote { lines: Vec<String> },
    UnorderedList { items: Vec<ListItem> },
    OrderedList { items: Vec<ListItem> },
    Table { rows: Vec<String> },
}

impl Block {
    fn list(kind: ListKind, items: Vec<ListItem>) -> Self {
        match kind {
            ListKind::Unordered => Block::UnorderedList { items },
            ListKind::Ordered => Block::OrderedList { items },
        }
    }

    /// Paragraph text as rendered: trimmed lines joined by a single space.
    pub fn joined_text(lines: &[String]) -> String {
        lines
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct BlockSegmenter<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> BlockSegmenter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
            pos: 0,
        }
    }

    /// Single forward pass over the lines; first matching rule wins.
    pub fn segment(mut self) -> Vec<Block> {
        let mut blocks = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            let trimmed = line.trim();

            if trimmed.starts_with(FENCE) {
                blocks.push(self.code_block(trimmed));
            } else if is_table_line(line) {
                blocks.push(Block::Table {
                    rows: self.take_while(is_table_line),
                });
            } else if is_quote_line(line) {
                blocks.push(Block::Blockquote {
                    lines: self.take_while(is_quote_line),
                });
            } else if HR_RE.is_match(trimmed) {
                self.pos += 1;
                blocks.push(Block::HorizontalRule);
            } else if trimmed.is_empty() {
                self.pos += 1;
            } else if LIST_ITEM_RE.is_match(line) {
                blocks.push(self.list(line));
            } else if HEADING_RE.is_match(line) {
                self.pos += 1;
                blocks.push(Block::Heading {
                    raw_line: line.to_string(),
                });
            } else {
                blocks.push(self.paragraph());
            }
        }
        blocks
    }

    fn take_while(&mut self, pred: fn(&str) -> bool) -> Vec<String> {
        let mut taken = Vec::new();
        while let Some(line) = self.lines.get(self.pos).filter(|l| pred(l)) {
            taken.push(line.to_string());
            self.pos += 1;
        }
        taken
    }

    fn code_block(&mut self, opening: &str) -> Block {
        let language = opening[FENCE.len()..]
            .split_whitespace()
            .next()
            .map(str::to_string);
        self.pos += 1;

        let mut code_lines = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            self.pos += 1;
            if line.trim().starts_with(FENCE) {
                break;
            }
            code_lines.push(*line);
        }

        Block::CodeBlock {
            code: code_lines.join("\n"),
            language,
        }
    }

    fn list(&mut self, first: &str) -> Block {
        let kind = if ORDERED_MARKER_RE.is_match(first) {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        };

        let mut items = Vec::new();
        while let Some(caps) = self
            .lines
            .get(self.pos)
            .and_then(|line| LIST_ITEM_RE.captures(line))
        {
            items.push(ListItem {
                content: caps[3].to_string(),
                indent: caps[1].chars().count(),
            });
            self.pos += 1;
        }
        Block::list(kind, items)
    }

    fn paragraph(&mut self) -> Block {
        let mut lines = vec![self.lines[self.pos].to_string()];
        self.pos += 1;
        while let Some(line) = self.lines.get(self.pos) {
            if line.trim().is_empty() || interrupts_paragraph(line) {
                break;
            }
            lines.push(line.to_string());
            self.pos += 1;
        }
        Block::Paragraph { lines }
    }
}

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn is_quote_line(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

fn interrupts_paragraph(line: &str) -> bool {
    is_table_line(line)
        || is_quote_line(line)
        || HEADING_RE.is_match(line)
        || line.trim().starts_with(FENCE)
}

/// Segment already-preprocessed text into blocks.
pub fn segment(text: &str) -> Vec<Block> {
    BlockSegmenter::new(text).segment()
}
