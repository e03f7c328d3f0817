//! User directory trait consulted by login.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Source of password hashes for login-capable accounts
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the bcrypt hash stored for `username`
    ///
    /// # Returns
    /// * `Ok(Some(hash))` - Account exists
    /// * `Ok(None)` - No such account
    /// * `Err(DomainError)` - Lookup failed
    async fn find_password_hash(&self, username: &str) -> Result<Option<String>, DomainError>;
}
