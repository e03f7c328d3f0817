//! Persistence seams of the domain: the cache store the token ledger lives in
//! and the directory login checks credentials against.

pub mod cache;
pub mod user;

pub use cache::{CacheStore, MemoryCacheStore, SharedCache};
pub use user::{InMemoryUserDirectory, UserDirectory};
