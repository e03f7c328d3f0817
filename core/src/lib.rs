//! # Keystone Core
//!
//! Domain layer for the Keystone backend. This crate owns the JWT access/refresh
//! token-pair lifecycle, the cache store seam it keeps its liveness ledger in,
//! the user directory seam used by login, and the error taxonomy shared by the
//! outer layers.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{Claims, TokenKind, TokenPair};
pub use errors::{AuthError, CacheError, DomainError, DomainResult, TokenError};
pub use repositories::{CacheStore, InMemoryUserDirectory, MemoryCacheStore, SharedCache, UserDirectory};
pub use services::{AuthService, TokenPairManager, TokenServiceConfig};
