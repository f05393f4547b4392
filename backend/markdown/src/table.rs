//! Pipe table parsing and rendering.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::inline::InlineRenderer;

static SEPARATOR_CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:?-+:?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_separator(cell: &str) -> Self {
        match (cell.starts_with(':'), cell.ends_with(':') && cell.len() > 1) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        }
    }

    fn style_attr(self) -> &'static str {
        match self {
            Alignment::None => "",
            Alignment::Left => r#" style="text-align: left""#,
            Alignment::Center => r#" style="text-align: center""#,
            Alignment::Right => r#" style="text-align: right""#,
        }
    }
}

/// Split a raw row on `|`, dropping the outer pipes and trimming each cell.
pub fn split_row(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// True when every cell is a dash run with optional alignment colons.
pub fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|cell| SEPARATOR_CELL_RE.is_match(cell))
}

pub fn render_table(rows: &[String]) -> String {
    let rows: Vec<Vec<String>> = rows.iter().map(|row| split_row(row)).collect();
    let Some((header, rest)) = rows.split_first() else {
        return String::new();
    };

    let (alignments, body): (Vec<Alignment>, &[Vec<String>]) = match rest.split_first() {
        Some((second, body)) if is_separator_row(second) => (
            second.iter().map(|cell| Alignment::from_separator(cell)).collect(),
            body,
        ),
        _ => (Vec::new(), rest),
    };

    let mut html = String::from("<table>\n<thead>\n");
    render_row(&mut html, "th", header, &alignments);
    html.push_str("</thead>\n");
    if !body.is_empty() {
        html.push_str("<tbody>\n");
        for row in body {
            render_row(&mut html, "td", row, &alignments);
        }
        html.push_str("</tbody>\n");
    }
    html.push_str("</table>\n");
    html
}

fn render_row(html: &mut String, cell_tag: &str, cells: &[String], alignments: &[Alignment]) {
    html.push_str("<tr>");
    for (i, cell) in cells.iter().enumerate() {
        let style = alignments.get(i).copied().unwrap_or(Alignment::None).style_attr();
        html.push_str(&format!(
            "<{cell_tag}{style}>{}</{cell_tag}>",
            InlineRenderer::render(cell)
        ));
    }
    html.push_str("</tr>\n");
}
