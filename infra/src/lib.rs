//! # Infrastructure Layer
//!
//! Concrete implementations of the seams declared in `ks_core`. Today that is
//! the cache store holding the token ledger: a Redis client with retry logic,
//! and a factory that picks the backend named in configuration.

use std::sync::Arc;
use std::time::Duration;

use ks_core::repositories::{CacheStore, MemoryCacheStore, SharedCache};
use ks_shared::config::{CacheBackend, CacheConfig};
use tracing::{info, warn};

/// Cache module - Redis client and operations
pub mod cache;

pub use cache::RedisCacheStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Build the cache store selected by `config`
///
/// A Redis store is connected (with retries) and pinged before it is
/// returned, so a bad URL or an unreachable server fails startup. A memory
/// store gets a background task sweeping expired entries.
pub async fn build_cache_store(config: &CacheConfig) -> Result<SharedCache, InfrastructureError> {
    match config.backend {
        CacheBackend::Memory => {
            warn!("Using in-memory cache store; tokens do not survive restarts or span instances");
            let store = Arc::new(MemoryCacheStore::new());
            if config.purge_interval_secs > 0 {
                store.start_purge_task(Duration::from_secs(config.purge_interval_secs));
            }
            let store: SharedCache = store;
            Ok(store)
        }
        CacheBackend::Redis => {
            let store = RedisCacheStore::new(config.clone()).await?;
            store
                .health_check()
                .await
                .map_err(|e| InfrastructureError::Config(format!("Redis health check failed: {}", e)))?;
            info!("Redis cache store ready");
            Ok(Arc::new(store))
        }
    }
}
