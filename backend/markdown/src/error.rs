use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the file-facing entry points of the engine.
///
/// Rendering itself never fails: malformed Markdown degrades to plain
/// paragraphs instead.
#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("markdown file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read markdown file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MarkdownError {
    /// True for the NotFound kind raised by `render_file`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarkdownError::FileNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, MarkdownError>;
