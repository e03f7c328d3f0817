//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Which store backs the token ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis server at `url`
    Redis,
    /// Process-local map; entries are lost on restart and not shared between instances
    Memory,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend selection
    pub backend: CacheBackend,

    /// Redis connection URL
    pub url: String,

    /// Maximum attempts for a cache operation before giving up
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    pub retry_delay_ms: u64,

    /// Seconds between sweeps of expired entries in the memory backend (0 = never)
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: String::from("redis://localhost:6379"),
            max_retries: 3,
            retry_delay_ms: 100,
            purge_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    /// Create a Redis cache configuration with URL
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create an in-memory cache configuration
    pub fn memory() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.purge_interval_secs, 60);
    }

    #[test]
    fn test_cache_config_constructors() {
        assert_eq!(CacheConfig::memory().backend, CacheBackend::Memory);
        assert_eq!(CacheConfig::redis("redis://cache:6380").url, "redis://cache:6380");
    }
}
