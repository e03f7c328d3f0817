//! Mock cache store for testing failure paths

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CacheError;

use super::memory::MemoryCacheStore;
use super::r#trait::CacheStore;

/// Memory store with switchable failures
///
/// Each `fail_*` flag makes the matching operations return
/// `CacheError::Connection`. `interleave_before_swap` stages a write that is
/// applied right before the next `compare_and_set`, standing in for another
/// request that got there first.
#[derive(Default)]
pub struct MockCacheStore {
    pub inner: MemoryCacheStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_expires: AtomicBool,
    pub fail_swaps: AtomicBool,
    interleaved: Mutex<Option<(String, Option<String>)>>,
}

impl MockCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Before the next swap, set `key` to `value` (or delete it for `None`)
    pub fn interleave_before_swap(&self, key: &str, value: Option<&str>) {
        *self.interleaved.lock().unwrap() = Some((key.to_string(), value.map(str::to_string)));
    }

    fn check(flag: &AtomicBool) -> Result<(), CacheError> {
        if flag.load(Ordering::SeqCst) {
            Err(CacheError::Connection("mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Self::check(&self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        Self::check(&self.fail_writes)?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Self::check(&self.fail_deletes)?;
        self.inner.delete(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        Self::check(&self.fail_expires)?;
        self.inner.expire(key, ttl).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        Self::check(&self.fail_swaps)?;

        let staged = self.interleaved.lock().unwrap().take();
        if let Some((staged_key, staged_value)) = staged {
            match staged_value {
                Some(staged_value) => {
                    self.inner
                        .set(&staged_key, &staged_value, Duration::from_secs(3600))
                        .await?
                }
                None => {
                    self.inner.delete(&staged_key).await?;
                }
            }
        }

        self.inner.compare_and_set(key, expected, value, ttl).await
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        Self::check(&self.fail_reads)
    }
}
