//! Containerized Redis for integration tests.

use redis::aio::MultiplexedConnection;
use redis::Client;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// A Redis server running in a throwaway container.
///
/// The container is stopped and removed when this struct is dropped. The
/// connection string feeds the configuration resolver the same way a real
/// `REDIS_URL` would; the ready-made connection is for direct assertions
/// against server state.
pub struct TestRedis {
    #[allow(dead_code)]
    container: ContainerAsync<Redis>,
    connection: MultiplexedConnection,
    connection_string: String,
}

impl TestRedis {
    /// Start a Redis container and connect to it.
    ///
    /// Uses the Redis 8 Alpine image.
    pub async fn new() -> Self {
        let container = Redis::default()
            .with_tag("8-alpine")
            .start()
            .await
            .expect("Failed to start Redis container");

        let host_port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let connection_string = format!("redis://127.0.0.1:{}", host_port);

        let client =
            Client::open(connection_string.clone()).expect("Failed to create Redis client");
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .expect("Failed to connect to Redis");

        tracing::info!(port = host_port, "Test Redis ready");

        Self {
            container,
            connection,
            connection_string,
        }
    }

    /// A cloned connection for direct assertions.
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// The `redis://` URL of the container.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

impl Drop for TestRedis {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Redis container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::AsyncCommands;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn set_and_get() {
        let server = TestRedis::new().await;
        let mut conn = server.connection();

        conn.set::<_, _, ()>("test_key", "test_value").await.unwrap();
        let value: String = conn.get("test_key").await.unwrap();
        assert_eq!(value, "test_value");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn delete_removes_the_key() {
        let server = TestRedis::new().await;
        let mut conn = server.connection();

        conn.set::<_, _, ()>("temp_key", "temp_value").await.unwrap();
        conn.del::<_, ()>("temp_key").await.unwrap();

        let exists: bool = conn.exists("temp_key").await.unwrap();
        assert!(!exists);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn keys_expire() {
        let server = TestRedis::new().await;
        let mut conn = server.connection();

        conn.set_ex::<_, _, ()>("expiring_key", "value", 1)
            .await
            .unwrap();
        assert!(conn.exists::<_, bool>("expiring_key").await.unwrap());

        tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
        assert!(!conn.exists::<_, bool>("expiring_key").await.unwrap());
    }
}
