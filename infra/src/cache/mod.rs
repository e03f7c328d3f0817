//! Cache module for the Redis-backed token ledger
//!
//! Connection management, retry with exponential backoff, and the
//! `CacheStore` operations including an atomic compare-and-set.

pub mod redis_client;


pub use redis_client::RedisCacheStore;
