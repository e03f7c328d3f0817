//! Token service module for JWT token-pair management
//!
//! This module handles the lifecycle of paired access/refresh tokens:
//! - HS256 signing with one secret per token kind
//! - Liveness ledger entries in the cache store
//! - Refresh-token rotation guarded by compare-and-set
//! - Release (logout) of both entries

mod config;
mod service;

#[cfg(test)]
pub(crate) mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenPairManager;
