//! Error types for authentication, token lifecycle and cache access
//!
//! The user-facing text for each variant lives in the error catalog of the
//! presentation layer; the messages here are for logs.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Access token not provided")]
    MissingToken,

    /// Unknown user or wrong password; the two are deliberately not told apart
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Token lifecycle errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    /// Well-formed token whose ledger entry is gone or belongs to someone else
    #[error("Token revoked")]
    TokenRevoked,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// A refresh entry points at an access token that no longer decodes
    #[error("Malformed access token in refresh entry")]
    MalformedAccessToken,

    #[error("Refresh token rotated concurrently")]
    RotationConflict,

    #[error("Failed to write token state: {0}")]
    CacheWrite(#[source] CacheError),

    #[error("Failed to delete token state: {0}")]
    CacheDelete(#[source] CacheError),
}

/// Cache store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}
