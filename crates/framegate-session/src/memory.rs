//! In-memory session store.
//!
//! Sessions live in a `HashMap` behind a single mutex, so check-and-remove
//! is atomic by construction. Each entry carries an idle-expiry deadline
//! that is refreshed on every access; expired entries are purged lazily on
//! the next store operation — there is no background sweeper.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::{SessionError, SessionId, SessionStore};

/// Default idle expiry: 30 minutes.
const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionEntry {
    tokens: HashSet<String>,
    expires_at: Instant,
}

/// An in-memory session store.
///
/// Thread-safe and async-compatible. All data is lost when the process
/// exits, which matches the one-time nature of handshake tokens.
#[derive(Debug)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    idle_ttl: Duration,
}

impl MemoryStore {
    /// Create a store with the default 30-minute idle expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }

    /// Create a store with a custom idle expiry.
    #[must_use]
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Number of live (non-expired) sessions. Used by tests.
    pub async fn session_count(&self) -> usize {
        let now = Instant::now();
        let sessions = self.sessions.lock().await;
        sessions.values().filter(|e| e.expires_at > now).count()
    }

    fn purge_expired(sessions: &mut HashMap<String, SessionEntry>, now: Instant) {
        sessions.retain(|_, entry| entry.expires_at > now);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn add_token(&self, session: &SessionId, token: &str) -> Result<(), SessionError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        Self::purge_expired(&mut sessions, now);

        let entry = sessions
            .entry(session.as_str().to_owned())
            .or_insert_with(|| SessionEntry {
                tokens: HashSet::new(),
                expires_at: now + self.idle_ttl,
            });
        entry.tokens.insert(token.to_owned());
        entry.expires_at = now + self.idle_ttl;

        tracing::debug!(session = %session, "token recorded");
        Ok(())
    }

    async fn consume_token(&self, session: &SessionId, token: &str) -> Result<bool, SessionError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        Self::purge_expired(&mut sessions, now);

        let Some(entry) = sessions.get_mut(session.as_str()) else {
            return Ok(false);
        };

        let consumed = entry.tokens.remove(token);
        if consumed {
            entry.expires_at = now + self.idle_ttl;
        }
        Ok(consumed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consume_unknown_session_returns_false() {
        let store = MemoryStore::new();
        let session = SessionId::generate();
        assert!(!store.consume_token(&session, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn consume_unknown_token_returns_false() {
        let store = MemoryStore::new();
        let session = SessionId::generate();
        store.add_token(&session, "abc").await.unwrap();
        assert!(!store.consume_token(&session, "def").await.unwrap());
    }

    #[tokio::test]
    async fn consume_succeeds_exactly_once() {
        let store = MemoryStore::new();
        let session = SessionId::generate();
        store.add_token(&session, "abc").await.unwrap();

        assert!(store.consume_token(&session, "abc").await.unwrap());
        assert!(!store.consume_token(&session, "abc").await.unwrap());
    }

    #[tokio::test]
    async fn tokens_are_session_scoped() {
        let store = MemoryStore::new();
        let alice = SessionId::generate();
        let bob = SessionId::generate();
        store.add_token(&alice, "abc").await.unwrap();

        assert!(!store.consume_token(&bob, "abc").await.unwrap());
        assert!(store.consume_token(&alice, "abc").await.unwrap());
    }

    #[tokio::test]
    async fn multiple_outstanding_tokens_per_session() {
        let store = MemoryStore::new();
        let session = SessionId::generate();
        store.add_token(&session, "one").await.unwrap();
        store.add_token(&session, "two").await.unwrap();

        assert!(store.consume_token(&session, "two").await.unwrap());
        assert!(store.consume_token(&session, "one").await.unwrap());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = MemoryStore::with_idle_ttl(Duration::from_millis(0));
        let session = SessionId::generate();
        store.add_token(&session, "abc").await.unwrap();

        // TTL of zero expires the entry as soon as the next operation runs.
        assert!(!store.consume_token(&session, "abc").await.unwrap());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn racing_consumers_see_one_success() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let session = SessionId::generate();
        store.add_token(&session, "abc").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = std::sync::Arc::clone(&store);
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                store.consume_token(&session, "abc").await.unwrap()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
