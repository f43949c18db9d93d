//! Redis as a first-class service for axum applications.
//!
//! This crate wires a Redis deployment into a web service in three steps:
//! resolve a connection description into a validated [`RedisConfiguration`],
//! build a [`RedisPool`] from it, and hand the cloneable [`Redis`] handle
//! (and optionally a [`RedisSessionStore`]) to the application state. All
//! protocol and pooling mechanics live in the `redis`/`bb8` drivers; this
//! crate only validates, translates, and delegates.
//!
//! ## Example
//!
//! ```ignore
//! use redis_service::{Redis, RedisConfiguration, RedisPool};
//!
//! let config = RedisConfiguration::from_url("redis://localhost:6379/0").await?;
//! let pool = RedisPool::connect_with_retry(&config).await?;
//! let redis = Redis::new(pool);
//!
//! redis.set("greeting", "hello").await?;
//! let greeting: String = redis.get("greeting").await?;
//! ```
//!
//! Invalid configuration fails before any pool exists — there is no
//! degraded half-connected state to reason about.

mod client;
mod config;
mod error;
mod health;
mod pool;
mod retry;
mod session;

pub use client::Redis;
pub use config::{PoolOptions, PoolSize, RedisConfiguration, DEFAULT_REDIS_PORT};
pub use error::{ConfigurationError, ServiceError};
pub use health::{check_health, check_health_detailed, HealthStatus};
pub use pool::RedisPool;
pub use retry::{retry_with_backoff, RetryConfig};
pub use session::{session_layer, RedisSessionStore};

// Re-export the driver and pool crates so consumers use the same versions
// this crate was built against.
pub use bb8_redis::bb8;
pub use bb8_redis::redis;
pub use bb8_redis::RedisConnectionManager;
