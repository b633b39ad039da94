//! Session middleware configuration.
//!
//! The session is the visitor's cart storage: the session cookie identifies the
//! browser and the cart JSON lives under a fixed key in the session record.
//!
//! Records are held in a bounded moka cache. Each entry is evicted at its
//! record's own expiry date, so abandoned sessions do not accumulate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{Expiry as CacheExpiry, future::Cache};
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "capstone_session";

/// Maximum number of live sessions kept in memory.
const MAX_SESSIONS: u64 = 100_000;

/// Evicts each record when its expiry date passes.
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(record: &Record) -> Duration {
        Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
    }
}

impl CacheExpiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _created_at: Instant) -> Option<Duration> {
        Some(Self::remaining(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::remaining(record))
    }
}

/// In-memory session store that drops records once they expire.
#[derive(Debug, Clone)]
pub struct CacheSessionStore {
    records: Cache<Id, Record>,
}

impl CacheSessionStore {
    /// Create a store holding at most `max_sessions` records.
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(RecordExpiry)
                .build(),
        }
    }

    /// Number of records currently held.
    pub async fn session_count(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }
}

impl Default for CacheSessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let entry = self.records.entry(record.id).or_insert(record.clone()).await;
            if entry.is_fresh() {
                return Ok(());
            }
            // Session ID collision.
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer with an in-memory store.
///
/// Sessions expire after `config.session_days` without activity.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<CacheSessionStore> {
    SessionManagerLayer::new(CacheSessionStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(config.session_days),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_sessions::cookie::time::Duration as TimeDuration;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: std::collections::HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = CacheSessionStore::default();
        let mut live = record(TimeDuration::minutes(30));
        store.create(&mut live).await.unwrap();

        assert_eq!(store.load(&live.id).await.unwrap(), Some(live.clone()));

        store.delete(&live.id).await.unwrap();
        assert_eq!(store.load(&live.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_record_is_evicted() {
        let store = CacheSessionStore::default();
        let stale = record(TimeDuration::seconds(-1));
        store.save(&stale).await.unwrap();

        assert_eq!(store.load(&stale.id).await.unwrap(), None);
        // Housekeeping runs on moka's own clock.
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_live_records_are_kept() {
        let store = CacheSessionStore::default();
        for _ in 0..3 {
            store.save(&record(TimeDuration::days(1))).await.unwrap();
        }
        assert_eq!(store.session_count().await, 3);
    }
}
