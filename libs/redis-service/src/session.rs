//! Redis-backed session storage for `tower-sessions`.
//!
//! Cookie handling stays entirely inside the session middleware; this
//! module only persists session records. Records are stored as JSON under
//! `session:{id}` with a TTL matching the record expiry, so stale sessions
//! disappear without a sweeper task.

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::pool::RedisPool;

const SESSION_KEY_PREFIX: &str = "session:";

/// Session store over the shared Redis pool.
#[derive(Clone, Debug)]
pub struct RedisSessionStore {
    pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(session_id: &Id) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, session_id)
    }

    /// Seconds until the record expires, floored at one so a record on the
    /// verge of expiry is still written with a valid TTL.
    fn ttl_seconds(record: &Record) -> u64 {
        let remaining = record.expiry_date - OffsetDateTime::now_utc();
        remaining.whole_seconds().max(1) as u64
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let payload = serde_json::to_string(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        conn.set_ex::<_, _, ()>(Self::key(&record.id), payload, Self::ttl_seconds(record))
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        let payload: Option<String> = conn
            .get(Self::key(session_id))
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        let record = payload
            .map(|payload| {
                serde_json::from_str::<Record>(&payload)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))
            })
            .transpose()?;

        // Redis evicts on TTL, but the record expiry is authoritative in
        // case the clocks disagree.
        Ok(record.filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        conn.del::<_, ()>(Self::key(session_id))
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        Ok(())
    }
}

/// Session middleware layer over a Redis-backed store.
///
/// Sessions expire after seven days of inactivity. `with_secure(false)`
/// keeps cookies usable over plain HTTP in development; production
/// deployments behind TLS should flip it.
pub fn session_layer(store: RedisSessionStore) -> SessionManagerLayer<RedisSessionStore> {
    SessionManagerLayer::new(store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(id: i128, expires_in: Duration) -> Record {
        Record {
            id: Id(id),
            data: HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[test]
    fn key_carries_the_session_prefix() {
        let id = Id(42);
        let key = RedisSessionStore::key(&id);
        assert!(key.starts_with("session:"));
        assert!(key.ends_with(&id.to_string()));
    }

    #[test]
    fn ttl_tracks_record_expiry() {
        let record = record(1, Duration::minutes(10));
        let ttl = RedisSessionStore::ttl_seconds(&record);
        assert!((595..=600).contains(&ttl));
    }

    #[test]
    fn ttl_never_drops_below_one_second() {
        let record = record(2, Duration::seconds(-30));
        assert_eq!(RedisSessionStore::ttl_seconds(&record), 1);
    }
}
