//! In-process cache store

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::errors::CacheError;

use super::r#trait::CacheStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// `None` when the deadline does not fit in an `Instant`
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

/// Cache store held in process memory
///
/// Used for single-instance deployments and tests. Expiry follows the tokio
/// clock, so paused-time tests can advance past a TTL. Expired entries are
/// invisible to readers and dropped on the next write that touches them or
/// on [`purge_expired`](Self::purge_expired), which
/// [`start_purge_task`](Self::start_purge_task) runs periodically.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Start a background task purging expired entries every `period`
    ///
    /// The task holds a weak reference and ends once the store is dropped.
    pub fn start_purge_task(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        info!("Memory cache purge task started - will run every {:?}", period);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(period);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval_timer.tick().await;

                let Some(store) = store.upgrade() else {
                    debug!("Memory cache dropped, purge task exiting");
                    break;
                };
                let purged = store.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "Purged expired cache entries");
                }
            }
        })
    }

    /// Number of entries held, expired ones included
    pub async fn held(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|entry| entry.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        if ttl.is_zero() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), Entry::new(value, ttl));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .map_or(false, |entry| entry.is_live(now)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let live = entries.get(key).map_or(false, |entry| entry.is_live(now));
        if !live {
            entries.remove(key);
            return Ok(false);
        }

        if ttl.is_zero() {
            entries.remove(key);
        } else if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = match (entry.expires_at, now.checked_add(ttl)) {
                (Some(current), Some(cap)) => Some(current.min(cap)),
                (None, cap) => cap,
                (current, None) => current,
            };
        }
        Ok(true)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let matches = entries
            .get(key)
            .map_or(false, |entry| entry.is_live(now) && entry.value == expected);
        if !matches {
            return Ok(false);
        }

        if ttl.is_zero() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), Entry::new(value, ttl));
        }
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
