//! Token entities for JWT-based authentication.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cache key prefix of access token entries (`sys_access_<token> -> username`)
pub const ACCESS_KEY_PREFIX: &str = "sys_access_";

/// Cache key prefix of refresh token entries (`sys_refresh_<token> -> access token`)
pub const REFRESH_KEY_PREFIX: &str = "sys_refresh_";

/// Number of leading token characters kept when a token is logged
const MASK_VISIBLE_CHARS: usize = 8;

/// Which half of a pair a token is, and therefore which secret signs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity
    pub username: String,

    /// Issuer (application name)
    pub iss: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID, unique per minted token
    pub jti: String,
}

impl Claims {
    /// Creates claims for `username` that expire `validity_minutes` from now
    ///
    /// # Arguments
    ///
    /// * `username` - Subject identity
    /// * `issuer` - Application name placed in `iss`
    /// * `validity_minutes` - Lifetime of the token; `0` expires immediately
    pub fn new(username: &str, issuer: &str, validity_minutes: u64) -> Self {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(validity_minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(60);

        Self {
            username: username.to_string(),
            iss: issuer.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Expiry as a UTC timestamp, if representable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Paired tokens handed out at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

/// Cache key of an access token entry
pub fn access_key(access_token: &str) -> String {
    format!("{}{}", ACCESS_KEY_PREFIX, access_token)
}

/// Cache key of a refresh token entry
pub fn refresh_key(refresh_token: &str) -> String {
    format!("{}{}", REFRESH_KEY_PREFIX, refresh_token)
}

/// Shortened form of a token that is safe to write to logs
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(MASK_VISIBLE_CHARS) {
        Some((idx, _)) => format!("{}***", &token[..idx]),
        None => "***".to_string(),
    }
}
