use std::time::Duration;

use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of memoized render results
    #[serde(with = "ttl_secs")]
    pub cache_ttl: Duration,
    /// Deepest list level that gets its own nested list; deeper items are clamped
    pub max_list_depth: usize,
    /// Emit `id` anchors on headings
    pub heading_ids: bool,
}

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_LIST_DEPTH: usize = 32;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_list_depth: DEFAULT_MAX_LIST_DEPTH,
            heading_ids: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_ttl: lookup("MDFORGE_CACHE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            max_list_depth: lookup("MDFORGE_MAX_LIST_DEPTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_LIST_DEPTH),
            heading_ids: lookup("MDFORGE_HEADING_IDS")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
        }
    }
}

mod ttl_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
