//! Redis cache store implementation
//!
//! Provides the Redis-backed [`CacheStore`] used for the token ledger, with a
//! multiplexed connection, retry logic for transient failures, and Lua
//! scripts for compare-and-set and TTL capping.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ks_core::domain::entities::token::{mask_token, ACCESS_KEY_PREFIX, REFRESH_KEY_PREFIX};
use ks_core::errors::CacheError;
use ks_core::repositories::CacheStore;
use ks_shared::config::CacheConfig;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

/// Upper bound of the backoff between two attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Swap KEYS[1] from ARGV[1] to ARGV[2] with a PX of ARGV[3]; a zero PX deletes.
///
/// A key already holding ARGV[2] also reports 1, so a retry after a lost
/// reply sees its own swap as done.
const COMPARE_AND_SET_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == ARGV[1] then
    if tonumber(ARGV[3]) > 0 then
        redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
    else
        redis.call('DEL', KEYS[1])
    end
    return 1
end
if current == ARGV[2] then
    return 1
end
return 0
"#;

/// Cap the remaining TTL of KEYS[1] at ARGV[1] milliseconds; a zero cap deletes
const CAP_TTL_SCRIPT: &str = r#"
local remaining = redis.call('PTTL', KEYS[1])
if remaining == -2 then
    return 0
end
local cap = tonumber(ARGV[1])
if cap <= 0 then
    redis.call('DEL', KEYS[1])
elseif remaining == -1 or remaining > cap then
    redis.call('PEXPIRE', KEYS[1], cap)
end
return 1
"#;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache store with retry logic
///
/// Cloning is cheap: clones share the multiplexed connection.
#[derive(Clone)]
pub struct RedisCacheStore {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this store
    config: CacheConfig,
    compare_and_set: Arc<Script>,
    cap_ttl: Arc<Script>,
}

impl RedisCacheStore {
    /// Connect to the Redis server named in `config`
    ///
    /// Connection attempts are retried `config.max_retries` times with
    /// exponential backoff starting at `config.retry_delay_ms`.
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!("Creating Redis cache store for {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        Ok(Self {
            connection,
            config,
            compare_and_set: Arc::new(Script::new(COMPARE_AND_SET_SCRIPT)),
            cap_ttl: Arc::new(Script::new(CAP_TTL_SCRIPT)),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Execute a Redis operation, retrying transient failures
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await
            .map_err(to_cache_error)?;

        debug!(key = %mask_key(key), found = result.is_some(), "GET");
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let millis = ttl_millis(ttl);
        if millis == 0 {
            // Redis rejects a zero expiry; an already-expired entry is an absent one
            self.delete(key).await?;
            return Ok(());
        }

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(millis)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(to_cache_error)?;

        debug!(key = %mask_key(key), ttl_ms = millis, "SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let deleted = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(to_cache_error)?;

        debug!(key = %mask_key(key), deleted, "DEL");
        Ok(deleted > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let millis = ttl_millis(ttl);
        let updated = self
            .execute_with_retry(|mut conn| {
                let script = Arc::clone(&self.cap_ttl);
                let key = key.to_string();
                Box::pin(async move {
                    script
                        .key(key)
                        .arg(millis)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(to_cache_error)?;

        debug!(key = %mask_key(key), ttl_ms = millis, updated, "Cap TTL");
        Ok(updated == 1)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let millis = ttl_millis(ttl);
        let swapped = self
            .execute_with_retry(|mut conn| {
                let script = Arc::clone(&self.compare_and_set);
                let key = key.to_string();
                let expected = expected.to_string();
                let value = value.to_string();
                Box::pin(async move {
                    script
                        .key(key)
                        .arg(expected)
                        .arg(value)
                        .arg(millis)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(to_cache_error)?;

        debug!(key = %mask_key(key), swapped, "Compare-and-set");
        Ok(swapped == 1)
    }

    /// Performs a PING command to verify connectivity
    async fn health_check(&self) -> Result<(), CacheError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(to_cache_error)?;

        if response == "PONG" {
            debug!("Redis health check passed");
            Ok(())
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Err(CacheError::Operation(format!(
                "unexpected PING response: {}",
                response
            )))
        }
    }
}

fn next_delay(delay: u64) -> u64 {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY_MS)
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

fn to_cache_error(error: RedisError) -> CacheError {
    if error.is_io_error() || error.is_connection_dropped() || error.is_connection_refusal() {
        CacheError::Connection(error.to_string())
    } else {
        CacheError::Operation(error.to_string())
    }
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask sensitive parts of Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}

/// Key with its token part masked, for logging
pub(crate) fn mask_key(key: &str) -> String {
    for prefix in [ACCESS_KEY_PREFIX, REFRESH_KEY_PREFIX] {
        if let Some(token) = key.strip_prefix(prefix) {
            return format!("{}{}", prefix, mask_token(token));
        }
    }
    mask_token(key)
}
