//! Connection pool construction from a resolved configuration.
//!
//! Pooling and reconnect mechanics belong to `bb8`/`redis`; this module
//! only translates a [`RedisConfiguration`] into what the driver accepts
//! and verifies connectivity with a `PING` before handing the pool out.

use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{
    cmd, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo,
};
use bb8_redis::RedisConnectionManager;
use tracing::info;

use crate::config::RedisConfiguration;
use crate::error::{ConfigurationError, ServiceError};
use crate::retry::{retry_with_backoff, RetryConfig};

/// Translate a resolved configuration into the driver's connection info.
///
/// The driver connects to a single address, so the first endpoint is used;
/// the configuration keeps the full list for pool implementations that
/// accept more.
fn connection_info(config: &RedisConfiguration) -> Option<ConnectionInfo> {
    let endpoint = config.endpoints.first()?;

    let mut redis = RedisConnectionInfo::default().set_db(config.database.unwrap_or(0));
    if let Some(password) = config.password.as_ref() {
        redis = redis.set_password(password);
    }

    let info = ConnectionAddr::Tcp(endpoint.ip().to_string(), endpoint.port())
        .into_connection_info()
        .ok()?
        .set_redis_settings(redis);
    Some(info)
}

/// Pooled Redis client produced from a [`RedisConfiguration`].
///
/// Cloning is cheap; all clones share the same underlying pool.
#[derive(Clone, Debug)]
pub struct RedisPool {
    pool: Pool<RedisConnectionManager>,
}

impl RedisPool {
    /// Build the pool and verify the connection with a `PING`.
    ///
    /// Sizing comes from the configuration's pool policy: `max_connections`
    /// bounds the pool, `min_connections` (clamped to that bound) is kept
    /// warm as idle connections.
    pub async fn connect(config: &RedisConfiguration) -> Result<Self, ServiceError> {
        let Some(info) = connection_info(config) else {
            return Err(ServiceError::Configuration(ConfigurationError::MissingHost));
        };
        let addr = info.addr().clone();

        let manager = RedisConnectionManager::new(info)?;

        let max_size = config.pool.max_connections.effective_max();
        let min_idle = config.pool.min_connections.min(max_size);

        let mut builder = Pool::builder().max_size(max_size);
        if min_idle > 0 {
            builder = builder.min_idle(Some(min_idle));
        }
        let pool = Self {
            pool: builder.build(manager).await?,
        };

        pool.ping().await?;
        info!(addr = %addr, max_size = max_size, "Connected to Redis");

        Ok(pool)
    }

    /// Connect with exponential backoff derived from the pool policy.
    ///
    /// When the policy carries a `retry_timeout`, the whole retry loop is
    /// bounded by it; otherwise only the attempt cap limits retries.
    pub async fn connect_with_retry(config: &RedisConfiguration) -> Result<Self, ServiceError> {
        let retry = RetryConfig::from_pool_options(&config.pool);

        match config.pool.retry_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, retry_with_backoff(|| Self::connect(config), retry))
                    .await
                    .map_err(|_| ServiceError::ConnectTimeout(limit))?
            }
            None => retry_with_backoff(|| Self::connect(config), retry).await,
        }
    }

    /// Check a connection out of the pool.
    pub async fn get(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, ServiceError> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip a `PING` through the pool.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        let mut conn = self.get().await?;
        let response: String = cmd("PING").query_async(&mut *conn).await?;

        if response != "PONG" {
            return Err(ServiceError::HealthCheckFailed(format!(
                "unexpected PING response: {}",
                response
            )));
        }

        Ok(())
    }

    /// Access the underlying bb8 pool.
    pub fn inner(&self) -> &Pool<RedisConnectionManager> {
        &self.pool
    }
}
