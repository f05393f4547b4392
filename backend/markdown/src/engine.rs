//! Public entry points: render text or files, write output, manage the cache.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::cache::{content_key, RenderCache, CONTENT_NAMESPACE, FILE_NAMESPACE};
use crate::config::EngineConfig;
use crate::error::{MarkdownError, Result};
use crate::ir::{segment, Block};
use crate::preprocess::preprocess;
use crate::renderer::{RenderContext, RenderOptions, Renderer};
use crate::validate;

/// Markdown to HTML engine.
///
/// Holds configuration and an optional cache only; every call builds its own
/// per-document state, so one engine can be shared across threads.
#[derive(Clone, Default)]
pub struct MarkdownEngine {
    config: EngineConfig,
    cache: Option<Arc<dyn RenderCache>>,
}

impl MarkdownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<dyn RenderCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render options that change the output; part of every cache key so
    /// engines with different settings can share one cache.
    fn options_tag(&self) -> String {
        format!("d{}h{}", self.config.max_list_depth, u8::from(self.config.heading_ids))
    }

    fn content_cache_key(&self, markdown: &str) -> String {
        format!("{}:{}", self.options_tag(), content_key(markdown))
    }

    fn file_cache_key(&self, path: &Path, mtime: Duration) -> String {
        format!(
            "{}:{}.{:09}:{}",
            path.display(),
            mtime.as_secs(),
            mtime.subsec_nanos(),
            self.options_tag()
        )
    }

    /// Render a Markdown document to HTML. Never fails.
    pub fn render(&self, markdown: &str) -> String {
        match &self.cache {
            Some(cache) => cache.get_or_insert_with(
                CONTENT_NAMESPACE,
                &self.content_cache_key(markdown),
                self.config.cache_ttl,
                &mut || self.render_uncached(markdown),
            ),
            None => self.render_uncached(markdown),
        }
    }

    fn render_uncached(&self, markdown: &str) -> String {
        let text = preprocess(markdown);
        let blocks = segment(&text);
        debug!(bytes = markdown.len(), blocks = blocks.len(), "Rendering markdown");

        let mut ctx = RenderContext::new(RenderOptions {
            max_list_depth: self.config.max_list_depth,
            heading_ids: self.config.heading_ids,
        });
        Renderer::to_html(&blocks, &mut ctx)
    }

    /// Read and render a Markdown file; cached by path and mtime when a cache is set.
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MarkdownError::FileNotFound(path.to_path_buf()),
            _ => MarkdownError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let read = || {
            fs::read_to_string(path).map_err(|source| MarkdownError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let Some(cache) = &self.cache else {
            info!(path = %path.display(), "Rendering markdown file");
            return Ok(self.render_uncached(&read()?));
        };

        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        let key = self.file_cache_key(path, mtime);

        // The file is only read on a miss.
        let mut failure = None;
        let html = cache.get_or_insert_with(FILE_NAMESPACE, &key, self.config.cache_ttl, &mut || {
            match read() {
                Ok(markdown) => {
                    info!(path = %path.display(), "Rendering markdown file");
                    self.render_uncached(&markdown)
                }
                Err(e) => {
                    failure = Some(e);
                    String::new()
                }
            }
        });
        if let Some(e) = failure {
            cache.forget(FILE_NAMESPACE, &key);
            return Err(e);
        }
        Ok(html)
    }

    /// Render `markdown` and write the HTML to `path`. Returns whether the write succeeded.
    pub fn render_to_file(&self, markdown: &str, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let html = self.render(markdown);
        match fs::write(path, html.as_bytes()) {
            Ok(()) => {
                info!(path = %path.display(), bytes = html.len(), "Wrote rendered HTML");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write rendered HTML");
                false
            }
        }
    }

    /// Drop cached output: one file's entries when `path` is given, otherwise everything.
    pub fn clear_cache(&self, path: Option<&Path>) {
        let Some(cache) = &self.cache else {
            return;
        };
        match path {
            Some(path) => cache.forget(FILE_NAMESPACE, &format!("{}:", path.display())),
            None => {
                cache.clear(CONTENT_NAMESPACE);
                cache.clear(FILE_NAMESPACE);
            }
        }
        debug!(path = ?path, "Render cache cleared");
    }

    /// Advisory lint of a document.
    pub fn validate(&self, markdown: &str) -> Vec<String> {
        validate::validate(markdown)
    }

    /// Preprocess and segment a document without rendering it.
    pub fn parse_blocks(&self, markdown: &str) -> Vec<Block> {
        segment(&preprocess(markdown))
    }
}

impl std::fmt::Debug for MarkdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownEngine")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
