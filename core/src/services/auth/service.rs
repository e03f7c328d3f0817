//! Main authentication service implementation

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::entities::token::TokenPair;
use crate::errors::{AuthError, DomainError};
use crate::repositories::{CacheStore, UserDirectory};
use crate::services::token::TokenPairManager;

/// Password checked against the decoy hash when the user is unknown
const DECOY_PASSWORD: &str = "keystone-decoy-password";

/// Authentication service handling login, refresh and logout
pub struct AuthService<U: UserDirectory, C: CacheStore> {
    users: U,
    tokens: Arc<TokenPairManager<C>>,
    decoy_cost: u32,
    decoy_hash: OnceCell<String>,
}

impl<U: UserDirectory, C: CacheStore> AuthService<U, C> {
    /// Creates a new authentication service
    ///
    /// # Arguments
    ///
    /// * `users` - Directory holding password hashes
    /// * `tokens` - Token-pair manager, usually also handed to the request gate
    pub fn new(users: U, tokens: Arc<TokenPairManager<C>>) -> Self {
        Self {
            users,
            tokens,
            decoy_cost: bcrypt::DEFAULT_COST,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Sets the bcrypt cost of the hash unknown users are checked against
    ///
    /// Should match the cost of the stored hashes.
    pub fn with_decoy_cost(mut self, cost: u32) -> Self {
        self.decoy_cost = cost;
        self
    }

    pub fn tokens(&self) -> &Arc<TokenPairManager<C>> {
        &self.tokens
    }

    /// Access validity applied to every pair this service issues
    pub fn access_validity_minutes(&self) -> u64 {
        self.tokens.config().access_validity_minutes
    }

    /// Checks credentials and issues a token pair
    ///
    /// Unknown users and wrong passwords both yield
    /// `AuthError::InvalidCredentials`. An unknown user still pays for one
    /// bcrypt verification against a decoy hash.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, DomainError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials.into());
        }

        let (hash, known) = match self.users.find_password_hash(username).await? {
            Some(hash) => (hash, true),
            None => (self.decoy_hash().await?.to_string(), false),
        };

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("password check aborted: {}", e)))?;

        match verified {
            Ok(true) if known => {}
            _ if !known => {
                info!(username = %username, "Login rejected: unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
            Ok(_) => {
                info!(username = %username, "Login rejected: wrong password");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Stored password hash is unusable");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        let pair = self
            .tokens
            .generate_token_pair(username, self.access_validity_minutes())
            .await?;

        info!(username = %username, "User logged in");
        Ok(pair)
    }

    /// Hash verified in place of a missing user's, built on first use
    pub(crate) async fn decoy_hash(&self) -> Result<&str, DomainError> {
        let cost = self.decoy_cost;
        let hash = self
            .decoy_hash
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || bcrypt::hash(DECOY_PASSWORD, cost))
                    .await
                    .map_err(|e| DomainError::internal(format!("decoy hash aborted: {}", e)))
                    .and_then(|hashed| {
                        hashed.map_err(|e| {
                            DomainError::internal(format!("decoy hash failed: {}", e))
                        })
                    })
            })
            .await?;
        Ok(hash.as_str())
    }

    /// Rotates the access token bound to `refresh_token`
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, DomainError> {
        Ok(self
            .tokens
            .refresh_token_pair(refresh_token, self.access_validity_minutes())
            .await?)
    }

    /// Releases both halves of a pair
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<bool, DomainError> {
        Ok(self
            .tokens
            .release_token_pair(access_token, refresh_token)
            .await?)
    }
}
