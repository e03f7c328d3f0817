//! Cache store trait backing the token liveness ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CacheError;

/// Key-value store with per-key expiry
///
/// Every operation is atomic on its key. A zero `ttl` means the entry is
/// already expired: it must not be readable afterwards.
///
/// Absence is not an error: `get` returns `Ok(None)` for a missing or expired
/// key and `Err` only when the store itself failed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value and TTL
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`
    ///
    /// # Returns
    /// * `Ok(true)` - The key existed
    /// * `Ok(false)` - Nothing to delete
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Cap the remaining TTL of an existing key at `ttl`
    ///
    /// A key that would expire sooner keeps its TTL. Returns `false` if the
    /// key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Store `value` with `ttl` only if `key` currently holds `expected`
    ///
    /// # Returns
    /// * `Ok(true)` - The swap happened
    /// * `Ok(false)` - The key is absent or holds another value; nothing changed
    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError>;

    /// Verify the store is reachable
    async fn health_check(&self) -> Result<(), CacheError>;
}

/// Cache store shared across workers
pub type SharedCache = Arc<dyn CacheStore>;

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        (**self).set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        (**self).delete(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        (**self).expire(key, ttl).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        (**self).compare_and_set(key, expected, value, ttl).await
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        (**self).health_check().await
    }
}
