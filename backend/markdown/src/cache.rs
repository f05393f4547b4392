//! Render memoization.
//!
//! The engine is a pure function; [`RenderCache`] is the seam through which a
//! caller can memoize its output, keyed by content hash or by file path and
//! modification time.

use std::time::{Duration, Instant};

use moka::sync::Cache;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Namespace for results keyed by the hash of the Markdown source.
pub const CONTENT_NAMESPACE: &str = "markdown.content";
/// Namespace for results keyed by file path and mtime.
pub const FILE_NAMESPACE: &str = "markdown.file";

const DEFAULT_MAX_ENTRIES: u64 = 10_000;

pub trait RenderCache: Send + Sync {
    /// Return the memoized value for `key`, or run `producer` and store its result for `ttl`.
    fn get_or_insert_with(
        &self,
        namespace: &str,
        key: &str,
        ttl: Duration,
        producer: &mut dyn FnMut() -> String,
    ) -> String;

    /// Evict every entry in `namespace`.
    fn clear(&self, namespace: &str);

    /// Evict entries whose key starts with `key_prefix`. Implementations
    /// without prefix eviction fall back to clearing the namespace.
    fn forget(&self, namespace: &str, _key_prefix: &str) {
        self.clear(namespace);
    }
}

/// Cache key for a Markdown source string.
pub fn content_key(markdown: &str) -> String {
    hex::encode(Sha256::digest(markdown.as_bytes()))
}

#[derive(Debug, Clone)]
struct CachedHtml {
    html: String,
    expires_at: Instant,
}

/// In-process [`RenderCache`] over a bounded moka cache.
#[derive(Clone)]
pub struct MokaRenderCache {
    cache: Cache<String, CachedHtml>,
}

impl Default for MokaRenderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaRenderCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{namespace}\u{1f}{key}")
    }

    fn evict_matching(&self, prefix: &str) {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.as_str().to_owned())
            .collect();
        for key in &keys {
            self.cache.invalidate(key);
        }
        debug!(prefix = %prefix.replace('\u{1f}', ":"), evicted = keys.len(), "Render cache entries evicted");
    }
}

impl RenderCache for MokaRenderCache {
    fn get_or_insert_with(
        &self,
        namespace: &str,
        key: &str,
        ttl: Duration,
        producer: &mut dyn FnMut() -> String,
    ) -> String {
        let full_key = Self::full_key(namespace, key);
        if let Some(entry) = self.cache.get(&full_key) {
            if entry.expires_at > Instant::now() {
                debug!(namespace, "Render cache hit");
                return entry.html;
            }
            self.cache.invalidate(&full_key);
        }

        debug!(namespace, "Render cache miss");
        let html = producer();
        self.cache.insert(
            full_key,
            CachedHtml {
                html: html.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        html
    }

    fn clear(&self, namespace: &str) {
        self.evict_matching(&Self::full_key(namespace, ""));
    }

    fn forget(&self, namespace: &str, key_prefix: &str) {
        self.evict_matching(&Self::full_key(namespace, key_prefix));
    }
}
