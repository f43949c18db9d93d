//! Health checks for readiness and liveness probes.

use tracing::debug;

use crate::error::ServiceError;
use crate::pool::RedisPool;

/// Verify Redis is reachable through the pool.
///
/// Round-trips a `PING` and fails on anything other than `PONG`.
pub async fn check_health(pool: &RedisPool) -> Result<(), ServiceError> {
    debug!("Running Redis health check");
    pool.ping().await?;
    debug!("Redis health check passed");
    Ok(())
}

/// Health check result for detailed status reporting
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether Redis answered the probe
    pub healthy: bool,

    /// Error message when unhealthy
    pub message: Option<String>,

    /// Probe round-trip time in milliseconds
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }
}

/// Probe Redis and report the outcome with timing, for monitoring
/// endpoints that want more than pass/fail.
pub async fn check_health_detailed(pool: &RedisPool) -> HealthStatus {
    let start = std::time::Instant::now();

    match check_health(pool).await {
        Ok(_) => HealthStatus::healthy(start.elapsed().as_millis() as u64),
        Err(e) => HealthStatus::unhealthy(e.to_string(), start.elapsed().as_millis() as u64),
    }
}
