use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token type reported to clients
pub const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl AuthResponse {
    pub fn bearer(access_token: String, refresh_token: String, validity_minutes: u64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: BEARER.to_string(),
            expires_in: validity_minutes.saturating_mul(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub released: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub token_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}
