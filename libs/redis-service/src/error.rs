//! Error types for configuration resolution and pooled operations.
//!
//! Configuration errors form a closed taxonomy: callers branch on the kind
//! to decide remediation (reject the URL, fail startup). Runtime errors
//! from the driver and pool are wrapped in [`ServiceError`] unchanged.

use thiserror::Error;

/// Validation failure while resolving a connection configuration.
///
/// All variants are deterministic for a given input and are returned
/// synchronously to the caller; nothing is retried or logged at this
/// layer. Resolution errors keep their original source.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Input string is not a parseable URI
    #[error("invalid Redis URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// URI has no scheme segment
    #[error("Redis URL is missing a scheme")]
    MissingScheme,

    /// Scheme is neither `redis` nor `rediss`
    #[error("invalid Redis URL scheme, expected \"redis\" or \"rediss\"")]
    InvalidScheme,

    /// URI has no host segment
    #[error("Redis URL is missing a host")]
    MissingHost,

    /// Explicit or parsed database index is negative
    #[error("Redis database index must not be negative")]
    NegativeDatabaseIndex,

    /// Hostname resolution failed; the resolver error passes through
    #[error("failed to resolve Redis host: {0}")]
    HostResolution(#[from] std::io::Error),
}

/// Unified error for pooled Redis operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Invalid configuration reached the pool layer
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] bb8_redis::redis::RedisError),

    /// Pool checkout failed
    #[error("connection pool error: {0}")]
    Pool(#[from] bb8_redis::bb8::RunError<bb8_redis::redis::RedisError>),

    /// Connection retries exceeded the configured overall bound
    #[error("connection attempts timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// Health check failed
    #[error("health check failed: {0}")]
    HealthCheckFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_messages_name_the_failure() {
        assert!(ConfigurationError::MissingScheme.to_string().contains("scheme"));
        assert!(ConfigurationError::MissingHost.to_string().contains("host"));
        assert!(
            ConfigurationError::NegativeDatabaseIndex
                .to_string()
                .contains("negative")
        );
    }

    #[test]
    fn host_resolution_preserves_the_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such host");
        let err = ConfigurationError::from(source);
        assert!(matches!(err, ConfigurationError::HostResolution(_)));
        assert!(err.to_string().contains("no such host"));
    }

    #[test]
    fn service_error_wraps_configuration_error() {
        let err = ServiceError::from(ConfigurationError::InvalidScheme);
        assert!(matches!(err, ServiceError::Configuration(_)));
    }
}
