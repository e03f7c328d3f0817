//! Error codes and the message catalog used to render them

use std::borrow::Cow;
use std::collections::HashMap;

/// Numeric codes carried in the `code` field of every response
pub mod codes {
    pub const SUCCESS: u32 = 0;

    pub const BAD_REQUEST: u32 = 40000;
    pub const UNAUTHORIZED: u32 = 40100;
    pub const TOKEN_EXPIRED: u32 = 40101;
    pub const TOKEN_INVALID: u32 = 40102;
    pub const REFRESH_TOKEN_INVALID: u32 = 40103;
    pub const INVALID_CREDENTIALS: u32 = 40104;
    pub const MISSING_TOKEN: u32 = 40105;
    pub const TOKEN_REVOKED: u32 = 40106;
    pub const STALE_TOKEN_STATE: u32 = 40107;
    pub const NOT_FOUND: u32 = 40400;
    pub const ROTATION_CONFLICT: u32 = 40900;

    pub const INTERNAL_ERROR: u32 = 50000;
    pub const TOKEN_SIGNING_FAILED: u32 = 50001;
    pub const CACHE_UNAVAILABLE: u32 = 50300;
}

const DEFAULT_MESSAGES: &[(u32, &str)] = &[
    (codes::SUCCESS, "OK"),
    (codes::BAD_REQUEST, "Malformed request"),
    (codes::UNAUTHORIZED, "Authentication required"),
    (codes::TOKEN_EXPIRED, "Access token has expired"),
    (codes::TOKEN_INVALID, "Invalid token"),
    (codes::REFRESH_TOKEN_INVALID, "Invalid or expired refresh token"),
    (codes::INVALID_CREDENTIALS, "Invalid username or password"),
    (codes::MISSING_TOKEN, "Access token not provided"),
    (codes::TOKEN_REVOKED, "Invalid or expired access token"),
    (codes::STALE_TOKEN_STATE, "Session state is stale, please log in again"),
    (codes::NOT_FOUND, "The requested resource was not found"),
    (codes::ROTATION_CONFLICT, "Refresh token was rotated concurrently, retry with the latest token"),
    (codes::INTERNAL_ERROR, "An internal error occurred"),
    (codes::TOKEN_SIGNING_FAILED, "Failed to issue token"),
    (codes::CACHE_UNAVAILABLE, "Token store is temporarily unavailable"),
];

/// Maps response codes to human-readable messages.
///
/// Built once at startup and handed to whatever renders responses. Overrides
/// from configuration replace the built-in text for the codes they name.
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    messages: HashMap<u32, String>,
}

impl ErrorCatalog {
    /// Catalog with the built-in messages plus `overrides`
    pub fn with_overrides(overrides: &HashMap<u32, String>) -> Self {
        let mut catalog = Self::default();
        for (code, message) in overrides {
            catalog.messages.insert(*code, message.clone());
        }
        catalog
    }

    /// Register or replace a message
    pub fn insert(&mut self, code: u32, message: impl Into<String>) {
        self.messages.insert(code, message.into());
    }

    /// Message for `code`, or a placeholder naming the unknown code
    pub fn message(&self, code: u32) -> Cow<'_, str> {
        match self.messages.get(&code) {
            Some(message) => Cow::Borrowed(message.as_str()),
            None => Cow::Owned(format!("Unknown error code: {}", code)),
        }
    }

    pub fn contains(&self, code: u32) -> bool {
        self.messages.contains_key(&code)
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(code, message)| (*code, (*message).to_string()))
                .collect(),
        }
    }
}
