//! Redis client used for quota counters
//!
//! Holds one multiplexed connection, cloned per command. Connecting and
//! idempotent commands are retried with exponential backoff; counter updates
//! are sent once so a retry can never count a request twice.

use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with retry logic
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of attempts for retried operations
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connect using the cache configuration
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, 3, 100).await
    }

    /// Connect with custom retry settings
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connect_timeout = Duration::from_secs(config.connection_timeout);
        let connection =
            Self::connect_with_retry(client, connect_timeout, max_retries, retry_delay_ms).await?;

        Ok(Self {
            connection,
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    async fn connect_with_retry(
        client: Client,
        connect_timeout: Duration,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Connecting to Redis");

            let result = tokio::time::timeout(
                connect_timeout,
                client.get_multiplexed_async_connection(),
            )
            .await;

            match result {
                Ok(Ok(connection)) => {
                    info!("Connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) if attempts < max_retries => {
                    warn!(attempt = attempts, error = %e, delay_ms = delay, "Redis connection failed, retrying");
                }
                Err(_) if attempts < max_retries => {
                    warn!(attempt = attempts, delay_ms = delay, "Redis connection timed out, retrying");
                }
                Ok(Err(e)) => {
                    error!(attempts, error = %e, "Giving up connecting to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
                Err(_) => {
                    error!(attempts, "Giving up connecting to Redis");
                    return Err(InfrastructureError::General(format!(
                        "Redis connection timed out after {}s",
                        connect_timeout.as_secs()
                    )));
                }
            }

            sleep(Duration::from_millis(delay)).await;
            delay = (delay * 2).min(5000);
        }
    }

    /// Key with the configured namespace prefix
    pub fn key(&self, suffix: &str) -> String {
        self.config.key(suffix)
    }

    /// Run an idempotent command, retrying transient failures
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;

            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(attempt = attempts, error = %e, delay_ms = delay, "Redis command failed, retrying");
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check if the Redis connection is healthy
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response: String = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async(&mut conn).await })
            })
            .await?;

        Ok(response == "PONG")
    }

    /// Increment a counter, setting `window_seconds` as its lifetime when the
    /// increment created it
    pub async fn increment_in_window(
        &self,
        key: &str,
        window_seconds: u64,
    ) -> Result<i64, InfrastructureError> {
        let mut conn = self.connection.clone();

        let count: i64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;
        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(key)
                .arg(window_seconds)
                .query_async::<_, ()>(&mut conn)
                .await?;
        }

        Ok(count)
    }

    /// Undo one increment
    pub async fn decrement(&self, key: &str) -> Result<i64, InfrastructureError> {
        let mut conn = self.connection.clone();
        let count: i64 = redis::cmd("DECR").arg(key).query_async(&mut conn).await?;
        Ok(count)
    }

    /// Delete a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = key.to_string();
        let removed: i64 = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("DEL").arg(key).query_async(&mut conn).await })
            })
            .await?;

        Ok(removed > 0)
    }

    /// Remaining lifetime of a key in seconds; `None` if missing or persistent
    pub async fn ttl(&self, key: &str) -> Result<Option<u64>, InfrastructureError> {
        let key = key.to_string();
        let ttl: i64 = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("TTL").arg(key).query_async(&mut conn).await })
            })
            .await?;

        Ok(u64::try_from(ttl).ok())
    }
}

pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
