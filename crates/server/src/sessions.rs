//! In-process session store and expiry sweeper.
//!
//! A session's presence in this store is the only proof of authentication.
//! The store is constructed at startup, injected through [`crate::state::AppState`],
//! and cleared at shutdown - there is no module-global state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use gavel_core::UserId;

use crate::models::session::{SessionToken, SessionUser};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sessionId";

/// Sessions older than this are removed by the sweeper (1 hour).
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60;

/// How often the background sweeper wakes (10 minutes).
pub const SWEEP_PERIOD_SECS: u64 = 10 * 60;

#[derive(Debug, Clone)]
struct SessionEntry {
    user: SessionUser,
    created_at: DateTime<Utc>,
}

/// Process-wide mapping from session token to authenticated-user snapshot.
///
/// Guarded by a single async `RwLock`; every critical section is a pure map
/// operation with no I/O under the lock, so contention stays negligible.
/// Expiry is sweep-driven only: [`SessionStore::get`] never checks age.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, SessionEntry>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, stamping the current time.
    ///
    /// Tokens are minted fresh on every login, so a collision is practically
    /// impossible; if one ever happens the old entry is overwritten.
    pub async fn put(&self, token: SessionToken, user: SessionUser) {
        self.insert_at(token, user, Utc::now()).await;
    }

    async fn insert_at(&self, token: SessionToken, user: SessionUser, created_at: DateTime<Utc>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(token, SessionEntry { user, created_at });
    }

    /// Look up the snapshot for a token. Absent tokens and swept (expired)
    /// tokens are indistinguishable.
    pub async fn get(&self, token: &SessionToken) -> Option<SessionUser> {
        let sessions = self.sessions.read().await;
        sessions.get(token).map(|entry| entry.user.clone())
    }

    /// Remove a session. No-op when the token is absent.
    pub async fn remove(&self, token: &SessionToken) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Find the live token for a user, if any.
    ///
    /// Supports idempotent login: at most one live session exists per user,
    /// so a linear scan over the (small) map is fine.
    pub async fn token_for_user(&self, user_id: UserId) -> Option<SessionToken> {
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .find(|(_, entry)| entry.user.id == user_id)
            .map(|(token, _)| token.clone())
    }

    /// Remove every session older than `max_age` relative to `now`.
    ///
    /// Returns the number of sessions removed.
    pub async fn sweep(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.signed_duration_since(entry.created_at) <= max_age);
        before - sessions.len()
    }

    /// Drop every session. Called once at shutdown.
    ///
    /// Returns the number of sessions dropped.
    pub async fn clear(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let dropped = sessions.len();
        sessions.clear();
        dropped
    }
}

/// Spawn the background expiry sweeper.
///
/// Runs on a fixed period independent of request traffic. The sweep takes the
/// same guard as request-path operations, performs no I/O under it, and
/// cannot fail, so request handling is never affected.
pub fn spawn_sweeper(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(SWEEP_PERIOD_SECS);
        let max_age = Duration::seconds(SESSION_MAX_AGE_SECS);
        loop {
            tokio::time::sleep(period).await;
            let removed = store.sweep(Utc::now(), max_age).await;
            if removed > 0 {
                tracing::debug!(removed, "session_sweep");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gavel_core::{Email, Username};

    use super::*;

    fn snapshot(id: i32, name: &str) -> SessionUser {
        SessionUser {
            id: UserId::new(id),
            username: Username::parse(name).unwrap(),
            email: Email::parse(&format!("{name}@example.com")).unwrap(),
        }
    }

    #[tokio::test]
    async fn put_then_get_returns_snapshot() {
        let store = SessionStore::new();
        let token = SessionToken::generate();
        store.put(token.clone(), snapshot(1, "alice")).await;

        let user = store.get(&token).await.unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn get_unknown_token_is_none() {
        let store = SessionStore::new();
        assert!(store.get(&SessionToken::from("nope")).await.is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = SessionStore::new();
        let token = SessionToken::generate();
        store.put(token.clone(), snapshot(1, "alice")).await;

        store.remove(&token).await;
        assert!(store.get(&token).await.is_none());
        // second removal is a no-op
        store.remove(&token).await;
    }

    #[tokio::test]
    async fn put_overwrites_existing_token() {
        let store = SessionStore::new();
        let token = SessionToken::from("fixed");
        store.put(token.clone(), snapshot(1, "alice")).await;
        store.put(token.clone(), snapshot(2, "bob")).await;

        assert_eq!(store.get(&token).await.unwrap().id, UserId::new(2));
    }

    #[tokio::test]
    async fn token_for_user_finds_only_that_user() {
        let store = SessionStore::new();
        let token = SessionToken::generate();
        store.put(token.clone(), snapshot(1, "alice")).await;

        assert_eq!(store.token_for_user(UserId::new(1)).await, Some(token));
        assert_eq!(store.token_for_user(UserId::new(2)).await, None);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_sessions() {
        let store = SessionStore::new();
        let max_age = Duration::seconds(SESSION_MAX_AGE_SECS);
        let now = Utc::now();

        let fresh = SessionToken::from("fresh");
        let stale = SessionToken::from("stale");
        store
            .insert_at(fresh.clone(), snapshot(1, "alice"), now - Duration::minutes(59))
            .await;
        store
            .insert_at(stale.clone(), snapshot(2, "bob"), now - Duration::minutes(61))
            .await;

        let removed = store.sweep(now, max_age).await;

        assert_eq!(removed, 1);
        assert!(store.get(&fresh).await.is_some());
        assert!(store.get(&stale).await.is_none());
    }

    #[tokio::test]
    async fn sweep_on_empty_store_removes_nothing() {
        let store = SessionStore::new();
        let removed = store
            .sweep(Utc::now(), Duration::seconds(SESSION_MAX_AGE_SECS))
            .await;
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let store = SessionStore::new();
        store.put(SessionToken::generate(), snapshot(1, "alice")).await;
        store.put(SessionToken::generate(), snapshot(2, "bob")).await;

        assert_eq!(store.clear().await, 2);
        assert_eq!(store.token_for_user(UserId::new(1)).await, None);
    }
}
