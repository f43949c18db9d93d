//! Shared test infrastructure for the workspace.
//!
//! Provides [`TestRedis`], a containerized Redis instance with automatic
//! cleanup. Tests that use it need a Docker daemon, so they are marked
//! `#[ignore]` throughout the workspace and run with
//! `cargo test -- --ignored`.
//!
//! ```rust,ignore
//! use test_utils::TestRedis;
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_redis_test() {
//!     let server = TestRedis::new().await;
//!     // Hand server.connection_string() to the configuration resolver,
//!     // or use server.connection() for direct assertions.
//! }
//! ```

mod redis;

pub use redis::TestRedis;
