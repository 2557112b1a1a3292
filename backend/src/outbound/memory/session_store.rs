//! Session store kept in memory with idle expiry.
//!
//! Entries are keyed by the token's SHA-256 fingerprint rather than the
//! token itself. A session that has not been resolved for longer than the
//! idle timeout is treated as absent and dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::debug;

pub use crate::domain::ports::DEFAULT_IDLE_TIMEOUT;
use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{IdentitySnapshot, SessionToken};

struct SessionEntry {
    identity: IdentitySnapshot,
    last_seen: DateTime<Utc>,
}

pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    clock: Arc<dyn Clock + Send + Sync>,
    idle_timeout: TimeDelta,
}

impl InMemorySessionStore {
    /// Create a store whose sessions expire after `idle_timeout` without use.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, idle_timeout: Duration) -> Self {
        let idle_timeout = TimeDelta::from_std(idle_timeout).unwrap_or(TimeDelta::MAX);
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
            idle_timeout,
        }
    }

    /// Number of sessions currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.last_seen) > self.idle_timeout
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, identity: IdentitySnapshot) -> Result<SessionToken, SessionStoreError> {
        let token = SessionToken::generate();
        let now = self.clock.utc();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        sessions.insert(
            token.fingerprint(),
            SessionEntry {
                identity,
                last_seen: now,
            },
        );
        Ok(token)
    }

    async fn find(
        &self,
        token: &SessionToken,
    ) -> Result<Option<IdentitySnapshot>, SessionStoreError> {
        let key = token.fingerprint();
        let now = self.clock.utc();
        let mut sessions = self.sessions.lock().await;
        let Some(entry) = sessions.get_mut(&key) else {
            return Ok(None);
        };
        if self.is_expired(entry, now) {
            sessions.remove(&key);
            debug!("session expired after idle timeout");
            return Ok(None);
        }
        entry.last_seen = now;
        Ok(Some(entry.identity.clone()))
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        self.sessions.lock().await.remove(&token.fingerprint());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, Email, Role, UserId};
    use crate::test_support::MutableClock;
    use rstest::{fixture, rstest};

    const IDLE: Duration = Duration::from_secs(60);

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(Utc::now()))
    }

    fn identity() -> IdentitySnapshot {
        IdentitySnapshot {
            id: UserId::random(),
            display_name: DisplayName::new("Ana").expect("name"),
            email: Email::new("ana@example.com").expect("email"),
            role: Role::Member,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn created_session_resolves_to_snapshot(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock, IDLE);
        let snapshot = identity();

        let token = store.create(snapshot.clone()).await.expect("create");

        assert_eq!(store.find(&token).await.expect("find"), Some(snapshot));
        assert_eq!(
            store
                .find(&SessionToken::generate())
                .await
                .expect("find unknown"),
            None
        );
    }

    #[rstest]
    #[tokio::test]
    async fn idle_sessions_expire_and_activity_refreshes(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock.clone(), IDLE);
        let token = store.create(identity()).await.expect("create");

        clock.advance_seconds(50);
        assert!(store.find(&token).await.expect("find").is_some());
        clock.advance_seconds(50);
        assert!(store.find(&token).await.expect("find").is_some());

        clock.advance_seconds(61);
        assert!(store.find(&token).await.expect("find").is_none());
        assert!(store.is_empty().await);
    }

    #[rstest]
    #[tokio::test]
    async fn destroy_is_idempotent(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock, IDLE);
        let token = store.create(identity()).await.expect("create");

        store.destroy(&token).await.expect("destroy");
        store.destroy(&token).await.expect("destroy again");

        assert!(store.find(&token).await.expect("find").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn create_sweeps_expired_sessions(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock.clone(), IDLE);
        store.create(identity()).await.expect("create");
        clock.advance_seconds(120);

        store.create(identity()).await.expect("create");

        assert_eq!(store.len().await, 1);
    }
}
