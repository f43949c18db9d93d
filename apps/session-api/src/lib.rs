//! Session API Service
//!
//! A small HTTP service demonstrating the Redis service layer end to end:
//!
//! ```text
//! REDIS_URL
//!   ↓ (configuration resolver: parse, validate, resolve host)
//! RedisConfiguration
//!   ↓ (pool construction with retry/backoff from the pool policy)
//! RedisPool
//!   ↓
//! Redis handle (app state) + RedisSessionStore (session middleware)
//! ```
//!
//! Routes:
//! - `GET /set/{value}` stores a value in the visitor's session
//! - `GET /get` reads it back (`n/a` when absent)
//! - `GET /del` destroys the session
//! - `GET /health` liveness probe
//! - `GET /ready` readiness probe (pings Redis through the pool)
//!
//! An invalid `REDIS_URL` is fatal to startup: no pool is constructed and
//! the process exits with the resolver's error.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use core_config::server::ServerConfig;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{env_required, Environment, FromEnv};
use eyre::{Result, WrapErr};
use redis_service::{
    check_health_detailed, session_layer, Redis, RedisConfiguration, RedisPool, RedisSessionStore,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tower_sessions::Session;
use tracing::{error, info};

const SESSION_NAME_KEY: &str = "name";

/// Shared application state, cloned per handler.
#[derive(Clone)]
pub struct AppState {
    pub redis: Redis,
}

/// Run the session API service.
///
/// # Errors
///
/// Returns an error if the server or Redis configuration is invalid, the
/// Redis connection cannot be established, or the server fails.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Starting session API service"
    );
    info!("Environment: {:?}", environment);

    let server = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;
    let redis_url = env_required("REDIS_URL").wrap_err("Failed to load Redis configuration")?;

    // Resolve and validate before anything connects; an invalid URL must
    // fail startup rather than produce a half-configured pool.
    let config = RedisConfiguration::from_url(&redis_url)
        .await
        .wrap_err("Invalid Redis configuration")?;

    info!("Connecting to Redis...");
    let pool = RedisPool::connect_with_retry(&config)
        .await
        .wrap_err("Failed to connect to Redis")?;
    info!("Connected to Redis successfully");

    let state = AppState {
        redis: Redis::new(pool.clone()),
    };
    let session_store = RedisSessionStore::new(pool);

    let app = Router::new()
        .route("/set/{value}", get(set_value))
        .route("/get", get(get_value))
        .route("/del", get(destroy_session))
        .layer(session_layer(session_store))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let address = server.address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind to {}", address))?;
    info!(address = %address, "Session API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server failed")?;

    info!("Session API service stopped");
    Ok(())
}

/// Store a value in the visitor's session.
async fn set_value(session: Session, Path(value): Path<String>) -> StatusCode {
    match session.insert(SESSION_NAME_KEY, value).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!(error = %e, "Failed to write session data");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Read the stored value back, or `n/a` when the session has none.
async fn get_value(session: Session) -> String {
    session
        .get::<String>(SESSION_NAME_KEY)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| "n/a".to_string())
}

/// Destroy the session and its server-side record.
async fn destroy_session(session: Session) -> StatusCode {
    match session.flush().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!(error = %e, "Failed to destroy session");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Liveness probe: the process is up.
async fn health_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Readiness probe: Redis must answer a PING through the pool.
async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let status = check_health_detailed(state.redis.pool()).await;

    if status.healthy {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "redis": "connected",
                "response_time_ms": status.response_time_ms,
            })),
        )
    } else {
        error!(error = ?status.message, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not ready",
                "redis": "disconnected",
            })),
        )
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        },
    }
}
