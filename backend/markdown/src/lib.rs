//! Markdown to HTML rendering engine.
//!
//! A hand-written two-phase parser: the document is first segmented into typed
//! blocks, then each block is rendered, with inline spans resolved through an
//! ordered placeholder pipeline. Rendering is pure and never fails; file
//! access and memoization are layered on top by [`MarkdownEngine`].

pub mod cache;
pub mod code_block;
pub mod config;
pub mod engine;
pub mod error;
pub mod heading;
pub mod inline;
pub mod ir;
pub mod list;
pub mod preprocess;
pub mod renderer;
pub mod table;
pub mod validate;

pub use cache::{MokaRenderCache, RenderCache};
pub use config::EngineConfig;
pub use engine::MarkdownEngine;
pub use error::{MarkdownError, Result};
pub use ir::{Block, ListItem, ListKind};
pub use validate::validate;

/// Render a document with the default configuration and no cache.
pub fn render(markdown: &str) -> String {
    MarkdownEngine::new().render(markdown)
}

/// Preprocess and segment a document into blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    ir::segment(&preprocess::preprocess(markdown))
}
