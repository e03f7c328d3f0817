//! Configuration for the token service

use ks_shared::config::{JwtConfig, OldAccessTokenPolicy};

/// Configuration for the token-pair manager
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Secret signing access tokens
    pub access_secret: String,
    /// Secret signing refresh tokens
    pub refresh_secret: String,
    /// Minutes a refresh token outlives its access token
    pub refresh_delay_minutes: u64,
    /// Access validity used when a caller does not pick one
    pub access_validity_minutes: u64,
    /// Issuer claim
    pub application_name: String,
    /// What rotation does to the superseded access token
    pub old_access_token_policy: OldAccessTokenPolicy,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            access_secret: config.access_secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            refresh_delay_minutes: config.refresh_delay_minutes,
            access_validity_minutes: config.access_validity_minutes,
            application_name: config.application_name.clone(),
            old_access_token_policy: config.old_access_token_policy,
        }
    }
}
