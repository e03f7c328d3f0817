//! Authentication configuration

use serde::{Deserialize, Serialize};

const DEFAULT_ACCESS_SECRET: &str = "access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "refresh-secret-change-in-production";

/// What happens to the previous access token's ledger entry when a refresh
/// token is rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OldAccessTokenPolicy {
    /// Leave the entry alone; it lapses with its own TTL
    KeepUntilExpiry,
    /// Cap the entry's remaining lifetime at the given number of seconds
    Grace(u64),
    /// Delete the entry as part of the rotation
    Revoke,
}

impl Default for OldAccessTokenPolicy {
    fn default() -> Self {
        OldAccessTokenPolicy::KeepUntilExpiry
    }
}

/// JWT token-pair configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Secret used to sign refresh tokens
    pub refresh_secret: String,

    /// Minutes a refresh token outlives its access token
    pub refresh_delay_minutes: u64,

    /// Default access token validity in minutes
    pub access_validity_minutes: u64,

    /// Issuer claim
    pub application_name: String,

    /// Treatment of the superseded access token on rotation
    pub old_access_token_policy: OldAccessTokenPolicy,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            refresh_delay_minutes: 120,
            access_validity_minutes: 30,
            application_name: String::from("keystone"),
            old_access_token_policy: OldAccessTokenPolicy::default(),
        }
    }
}

impl JwtConfig {
    /// Create a JWT configuration with the two signing secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set the default access token validity
    pub fn with_access_validity_minutes(mut self, minutes: u64) -> Self {
        self.access_validity_minutes = minutes;
        self
    }

    /// Set the refresh delay
    pub fn with_refresh_delay_minutes(mut self, minutes: u64) -> Self {
        self.refresh_delay_minutes = minutes;
        self
    }

    /// Check if either secret is still the shipped default (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Reject configurations that would make tokens forgeable or unusable
    pub fn validate(&self) -> Result<(), String> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err("jwt secrets must not be empty".to_string());
        }
        if self.access_secret == self.refresh_secret {
            return Err("jwt access and refresh secrets must differ".to_string());
        }
        if self.access_validity_minutes == 0 {
            return Err("jwt.access_validity_minutes must be positive".to_string());
        }
        Ok(())
    }
}

/// A login-capable account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserCredential {
    pub username: String,

    /// bcrypt hash of the password
    pub password_hash: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accounts accepted by the login endpoint
    pub users: Vec<UserCredential>,
}
