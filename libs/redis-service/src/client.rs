//! Application-facing Redis handle.

use bb8_redis::redis::{AsyncCommands, Cmd, FromRedisValue};

use crate::error::ServiceError;
use crate::pool::RedisPool;

/// Cloneable Redis handle for application state.
///
/// Each call checks a connection out of the shared pool, runs the command,
/// and returns the connection on drop, so a single handle can serve any
/// number of concurrent requests. Commands without a typed helper go
/// through [`Redis::send`].
#[derive(Clone, Debug)]
pub struct Redis {
    pool: RedisPool,
}

impl Redis {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// The pool backing this handle.
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    pub async fn get<T: FromRedisValue>(&self, key: &str) -> Result<T, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(conn.get(key).await?)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    /// Set a value with a time-to-live in seconds.
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    pub async fn del(&self, key: &str) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> Result<bool, ServiceError> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    pub async fn incr(&self, key: &str, delta: i64) -> Result<i64, ServiceError> {
        let mut conn = self.pool.get().await?;
        let value: i64 = conn.incr(key, delta).await?;
        Ok(value)
    }

    /// Set a key's time-to-live; returns whether the key existed.
    pub async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool, ServiceError> {
        let mut conn = self.pool.get().await?;
        let updated: bool = conn.expire(key, ttl_seconds).await?;
        Ok(updated)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.pool.ping().await
    }

    /// Run an arbitrary command against a pooled connection.
    ///
    /// ```ignore
    /// use redis_service::redis::cmd;
    ///
    /// let info: String = redis.send(cmd("INFO")).await?;
    /// ```
    pub async fn send<T: FromRedisValue>(&self, command: Cmd) -> Result<T, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(command.query_async(&mut *conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisConfiguration;

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn round_trip_against_live_redis() {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let config = RedisConfiguration::from_url(&url).await.unwrap();
        let redis = Redis::new(RedisPool::connect(&config).await.unwrap());

        redis.set("client_test_key", "value").await.unwrap();
        let value: String = redis.get("client_test_key").await.unwrap();
        assert_eq!(value, "value");

        redis.del("client_test_key").await.unwrap();
        assert!(!redis.exists("client_test_key").await.unwrap());
    }
}
