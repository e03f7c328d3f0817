//! Unit tests for the in-memory cache store

use std::sync::Arc;
use std::time::Duration;

use crate::repositories::cache::{CacheStore, MemoryCacheStore, SharedCache};

#[tokio::test]
async fn test_set_get_delete() {
    let store = MemoryCacheStore::new();

    store.set("k", "v", Duration::from_secs(60)).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    assert!(store.delete("k").await.unwrap());
    assert!(!store.delete("k").await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_zero_ttl_is_already_expired() {
    let store = MemoryCacheStore::new();

    store.set("k", "v", Duration::ZERO).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_entries_expire_with_clock() {
    tokio::time::pause();
    let store = MemoryCacheStore::new();

    store.set("k", "v", Duration::from_secs(60)).await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
    assert_eq!(store.purge_expired().await, 1);
}

#[tokio::test]
async fn test_expire_shortens_ttl() {
    tokio::time::pause();
    let store = MemoryCacheStore::new();

    store.set("k", "v", Duration::from_secs(600)).await.unwrap();
    assert!(store.expire("k", Duration::from_secs(5)).await.unwrap());
    assert!(!store.expire("missing", Duration::from_secs(5)).await.unwrap());

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(!store.expire("k", Duration::from_secs(5)).await.unwrap());
}

#[tokio::test]
async fn test_expire_never_extends_ttl() {
    tokio::time::pause();
    let store = MemoryCacheStore::new();

    store.set("k", "v", Duration::from_secs(60)).await.unwrap();
    assert!(store.expire("k", Duration::from_secs(600)).await.unwrap());

    tokio::time::advance(Duration::from_secs(60)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_purge_task_reclaims_expired_entries() {
    tokio::time::pause();
    let store = Arc::new(MemoryCacheStore::new());
    let task = store.start_purge_task(Duration::from_secs(60));

    for i in 0..1000 {
        store
            .set(&format!("k{}", i), "v", Duration::from_secs(60))
            .await
            .unwrap();
    }
    assert_eq!(store.held().await, 1000);

    tokio::time::advance(Duration::from_secs(3600)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(store.len().await, 0);
    assert_eq!(store.held().await, 0);

    // The task stops once the store is gone
    drop(store);
    tokio::time::advance(Duration::from_secs(60)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(task.is_finished());
}

#[tokio::test]
async fn test_compare_and_set() {
    let store = MemoryCacheStore::new();
    let ttl = Duration::from_secs(60);

    assert!(!store.compare_and_set("k", "a", "b", ttl).await.unwrap());

    store.set("k", "a", ttl).await.unwrap();
    assert!(!store.compare_and_set("k", "x", "b", ttl).await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), Some("a".to_string()));

    assert!(store.compare_and_set("k", "a", "b", ttl).await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), Some("b".to_string()));
}

#[tokio::test]
async fn test_compare_and_set_ignores_expired_value() {
    tokio::time::pause();
    let store = MemoryCacheStore::new();

    store.set("k", "a", Duration::from_secs(1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    assert!(!store
        .compare_and_set("k", "a", "b", Duration::from_secs(60))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_shared_handle_delegates() {
    let store: SharedCache = Arc::new(MemoryCacheStore::new());
    let handle = Arc::clone(&store);

    store.set("k", "v", Duration::from_secs(60)).await.unwrap();
    assert_eq!(handle.get("k").await.unwrap(), Some("v".to_string()));
    assert!(handle.health_check().await.is_ok());
}
