//! End-to-end tests against a containerized Redis.
//!
//! These need a Docker daemon; run with `cargo test -- --ignored`.

use std::collections::HashMap;

use redis_service::{check_health, Redis, RedisConfiguration, RedisPool, RedisSessionStore};
use test_utils::TestRedis;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::SessionStore;

#[tokio::test]
#[ignore = "requires Docker"]
async fn resolve_connect_and_round_trip() {
    let server = TestRedis::new().await;

    let config = RedisConfiguration::from_url(server.connection_string())
        .await
        .unwrap();
    let redis = Redis::new(RedisPool::connect(&config).await.unwrap());

    redis.set("greeting", "hello").await.unwrap();
    let value: String = redis.get("greeting").await.unwrap();
    assert_eq!(value, "hello");

    redis.del("greeting").await.unwrap();
    assert!(!redis.exists("greeting").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn raw_command_passthrough() {
    let server = TestRedis::new().await;

    let config = RedisConfiguration::from_url(server.connection_string())
        .await
        .unwrap();
    let redis = Redis::new(RedisPool::connect(&config).await.unwrap());

    let info: String = redis.send(redis_service::redis::cmd("INFO")).await.unwrap();
    assert!(info.contains("redis_version"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn health_check_against_live_redis() {
    let server = TestRedis::new().await;

    let config = RedisConfiguration::from_url(server.connection_string())
        .await
        .unwrap();
    let pool = RedisPool::connect(&config).await.unwrap();

    check_health(&pool).await.unwrap();

    let status = redis_service::check_health_detailed(&pool).await;
    assert!(status.healthy);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn session_store_round_trip() {
    let server = TestRedis::new().await;

    let config = RedisConfiguration::from_url(server.connection_string())
        .await
        .unwrap();
    let store = RedisSessionStore::new(RedisPool::connect(&config).await.unwrap());

    let mut data = HashMap::new();
    data.insert("name".to_string(), serde_json::json!("ferris"));
    let record = Record {
        id: Id(7),
        data,
        expiry_date: OffsetDateTime::now_utc() + Duration::minutes(5),
    };

    store.save(&record).await.unwrap();

    let loaded = store.load(&record.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, record.id);
    assert_eq!(loaded.data.get("name"), Some(&serde_json::json!("ferris")));

    store.delete(&record.id).await.unwrap();
    assert!(store.load(&record.id).await.unwrap().is_none());
}
