use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    /// `up` or `down`
    pub cache: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(cache_up: bool) -> Self {
        Self {
            status: if cache_up { "healthy" } else { "degraded" }.to_string(),
            cache: if cache_up { "up" } else { "down" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.cache == "up"
    }
}
