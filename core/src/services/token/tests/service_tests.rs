//! Unit tests for token signing and parsing

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use ks_shared::config::OldAccessTokenPolicy;

use super::{manager_with, ACCESS_SECRET, REFRESH_SECRET};
use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::TokenError;
use crate::repositories::MemoryCacheStore;

fn expired_token(secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        username: "alice".to_string(),
        iss: "keystone-test".to_string(),
        iat: now - 600,
        exp: now - 60,
        jti: "expired".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_generate_and_parse_access_token() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    let token = manager.generate_token("alice", TokenKind::Access, 10).unwrap();
    let claims = manager.parse_token(&token, ACCESS_SECRET).unwrap();

    assert_eq!(claims.username, "alice");
    assert_eq!(claims.iss, "keystone-test");
    assert_eq!(claims.exp - claims.iat, 600);
    assert_eq!(manager.parse_access_token(&token).unwrap(), claims);
}

#[test]
fn test_refresh_token_uses_refresh_secret() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    let token = manager.generate_token("alice", TokenKind::Refresh, 15).unwrap();

    assert!(manager.parse_token(&token, REFRESH_SECRET).is_ok());
    assert!(matches!(
        manager.parse_access_token(&token),
        Err(TokenError::InvalidSignature)
    ));
}

#[test]
fn test_access_token_rejected_with_refresh_secret() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    let token = manager.generate_token("alice", TokenKind::Access, 10).unwrap();

    assert!(matches!(
        manager.parse_token(&token, REFRESH_SECRET),
        Err(TokenError::InvalidSignature)
    ));
}

#[test]
fn test_expired_token() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    let token = expired_token(ACCESS_SECRET);
    assert!(matches!(
        manager.parse_access_token(&token),
        Err(TokenError::Expired)
    ));
}

#[test]
fn test_signature_checked_before_expiry() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    let token = expired_token("some-other-secret");
    assert!(matches!(
        manager.parse_access_token(&token),
        Err(TokenError::InvalidSignature)
    ));
}

#[test]
fn test_garbage_token() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    assert!(matches!(
        manager.parse_access_token("not-a-jwt"),
        Err(TokenError::InvalidTokenFormat)
    ));
    assert!(matches!(
        manager.parse_access_token(""),
        Err(TokenError::InvalidTokenFormat)
    ));
}

#[test]
fn test_tokens_minted_together_differ() {
    let manager = manager_with(
        Arc::new(MemoryCacheStore::new()),
        OldAccessTokenPolicy::KeepUntilExpiry,
    );

    let first = manager.generate_token("alice", TokenKind::Access, 10).unwrap();
    let second = manager.generate_token("alice", TokenKind::Access, 10).unwrap();
    assert_ne!(first, second);
}
