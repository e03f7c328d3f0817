//! Token-pair manager implementation

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ks_shared::config::OldAccessTokenPolicy;
use tracing::{debug, info, warn};

use crate::domain::entities::token::{
    access_key, mask_token, refresh_key, Claims, TokenKind, TokenPair,
};
use crate::errors::TokenError;
use crate::repositories::CacheStore;

use super::config::TokenServiceConfig;

/// Manages paired access/refresh tokens
///
/// Tokens are HS256 JWTs; the cache holds the ledger that decides whether a
/// correctly signed token is still live:
///
/// * `sys_access_<access>` -> username, TTL = access validity
/// * `sys_refresh_<refresh>` -> current access token, TTL = validity + refresh delay
///
/// The manager keeps no mutable state of its own, so one instance can be
/// shared by every worker.
pub struct TokenPairManager<C: CacheStore> {
    cache: C,
    config: TokenServiceConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    validation: Validation,
}

impl<C: CacheStore> TokenPairManager<C> {
    /// Creates a new manager on top of `cache`
    pub fn new(cache: C, config: TokenServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            cache,
            config,
            validation,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Signs a single token for `username`
    ///
    /// # Arguments
    ///
    /// * `username` - Subject identity
    /// * `kind` - Selects the signing secret
    /// * `validity_minutes` - Lifetime written into `exp`
    pub fn generate_token(
        &self,
        username: &str,
        kind: TokenKind,
        validity_minutes: u64,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(username, &self.config.application_name, validity_minutes);
        let key = match kind {
            TokenKind::Access => &self.access_encoding,
            TokenKind::Refresh => &self.refresh_encoding,
        };

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issues a token pair and records both ledger entries
    ///
    /// The access entry is written before the refresh entry. A failed second
    /// write leaves the first in place; it lapses with its TTL.
    pub async fn generate_token_pair(
        &self,
        username: &str,
        access_validity_minutes: u64,
    ) -> Result<TokenPair, TokenError> {
        let refresh_validity_minutes = self.refresh_validity_minutes(access_validity_minutes);

        let access_token = self.generate_token(username, TokenKind::Access, access_validity_minutes)?;
        let refresh_token =
            self.generate_token(username, TokenKind::Refresh, refresh_validity_minutes)?;

        self.cache
            .set(
                &access_key(&access_token),
                username,
                minutes(access_validity_minutes),
            )
            .await
            .map_err(TokenError::CacheWrite)?;

        self.cache
            .set(
                &refresh_key(&refresh_token),
                &access_token,
                minutes(refresh_validity_minutes),
            )
            .await
            .map_err(TokenError::CacheWrite)?;

        debug!(
            username = %username,
            access_token = %mask_token(&access_token),
            "Issued token pair"
        );

        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Verifies `token` against `secret` and returns its claims
    ///
    /// The signature is checked before the expiry, so an expired token signed
    /// with another secret reports `InvalidSignature`. No cache access.
    pub fn parse_token(&self, token: &str, secret: &str) -> Result<Claims, TokenError> {
        decode_claims(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &self.validation,
        )
    }

    /// [`parse_token`](Self::parse_token) with the configured access secret
    pub fn parse_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode_claims(token, &self.access_decoding, &self.validation)
    }

    /// Checks the ledger entry of an access token
    ///
    /// True iff the entry exists and names exactly `username`. Cache failures
    /// are logged and read as `false`.
    pub async fn is_valid_access_token(&self, username: &str, access_token: &str) -> bool {
        match self.cache.get(&access_key(access_token)).await {
            Ok(Some(owner)) => owner == username,
            Ok(None) => false,
            Err(e) => {
                warn!(
                    access_token = %mask_token(access_token),
                    error = %e,
                    "Access token lookup failed"
                );
                false
            }
        }
    }

    /// Verifies a bearer token and its ledger entry
    ///
    /// Returns `TokenRevoked` for a well-formed token that is no longer live.
    pub async fn authenticate(&self, access_token: &str) -> Result<Claims, TokenError> {
        let claims = self.parse_access_token(access_token)?;

        if !self.is_valid_access_token(&claims.username, access_token).await {
            debug!(
                username = %claims.username,
                access_token = %mask_token(access_token),
                "Rejected access token without a live entry"
            );
            return Err(TokenError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Rotates the access token bound to `refresh_token`
    ///
    /// The refresh entry is swapped from the old access token to the new one
    /// with compare-and-set. When another rotation wins the swap, the access
    /// entry written here is removed again and `RotationConflict` is returned.
    ///
    /// The old access token is decoded exactly as `parse_access_token` would;
    /// a bad signature or a lapsed `exp` both surface as `MalformedAccessToken`.
    ///
    /// # Returns
    ///
    /// The new access token; the refresh token itself is unchanged.
    pub async fn refresh_token_pair(
        &self,
        refresh_token: &str,
        access_validity_minutes: u64,
    ) -> Result<String, TokenError> {
        let refresh_entry = refresh_key(refresh_token);

        let old_access_token = match self.cache.get(&refresh_entry).await {
            Ok(Some(access_token)) => access_token,
            Ok(None) => return Err(TokenError::InvalidRefreshToken),
            Err(e) => {
                warn!(
                    refresh_token = %mask_token(refresh_token),
                    error = %e,
                    "Refresh token lookup failed"
                );
                return Err(TokenError::InvalidRefreshToken);
            }
        };

        let claims = decode_claims(&old_access_token, &self.access_decoding, &self.validation)
            .map_err(|e| {
                warn!(
                    refresh_token = %mask_token(refresh_token),
                    access_token = %mask_token(&old_access_token),
                    error = %e,
                    "Refresh entry points at an invalid or expired access token"
                );
                TokenError::MalformedAccessToken
            })?;

        let new_access_token =
            self.generate_token(&claims.username, TokenKind::Access, access_validity_minutes)?;
        let new_access_entry = access_key(&new_access_token);

        self.cache
            .set(
                &new_access_entry,
                &claims.username,
                minutes(access_validity_minutes),
            )
            .await
            .map_err(TokenError::CacheWrite)?;

        let swapped = self
            .cache
            .compare_and_set(
                &refresh_entry,
                &old_access_token,
                &new_access_token,
                minutes(self.refresh_validity_minutes(access_validity_minutes)),
            )
            .await;

        match swapped {
            Ok(true) => {}
            Ok(false) => {
                self.discard_access_entry(&new_access_entry).await;
                return match self.cache.get(&refresh_entry).await {
                    Ok(None) => Err(TokenError::InvalidRefreshToken),
                    _ => {
                        info!(
                            username = %claims.username,
                            refresh_token = %mask_token(refresh_token),
                            "Lost refresh token rotation race"
                        );
                        Err(TokenError::RotationConflict)
                    }
                };
            }
            Err(e) => {
                self.discard_access_entry(&new_access_entry).await;
                return Err(TokenError::CacheWrite(e));
            }
        }

        self.retire_access_token(&old_access_token).await?;

        debug!(
            username = %claims.username,
            access_token = %mask_token(&new_access_token),
            "Rotated access token"
        );

        Ok(new_access_token)
    }

    /// Deletes both ledger entries of a pair
    ///
    /// The tokens need not be valid or even well-formed. Deletion of the
    /// access entry comes first.
    pub async fn release_token_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<bool, TokenError> {
        self.cache
            .delete(&access_key(access_token))
            .await
            .map_err(TokenError::CacheDelete)?;
        self.cache
            .delete(&refresh_key(refresh_token))
            .await
            .map_err(TokenError::CacheDelete)?;

        debug!(access_token = %mask_token(access_token), "Released token pair");
        Ok(true)
    }

    fn refresh_validity_minutes(&self, access_validity_minutes: u64) -> u64 {
        access_validity_minutes.saturating_add(self.config.refresh_delay_minutes)
    }

    async fn retire_access_token(&self, old_access_token: &str) -> Result<(), TokenError> {
        let key = access_key(old_access_token);
        match self.config.old_access_token_policy {
            OldAccessTokenPolicy::KeepUntilExpiry => Ok(()),
            OldAccessTokenPolicy::Grace(seconds) => self
                .cache
                .expire(&key, Duration::from_secs(seconds))
                .await
                .map(|_| ())
                .map_err(TokenError::CacheWrite),
            OldAccessTokenPolicy::Revoke => self
                .cache
                .delete(&key)
                .await
                .map(|_| ())
                .map_err(TokenError::CacheDelete),
        }
    }

    async fn discard_access_entry(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(error = %e, "Failed to discard access entry of an abandoned rotation");
        }
    }
}

fn decode_claims(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<Claims, TokenError> {
    decode::<Claims>(token, key, validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::InvalidTokenFormat,
        })
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}
