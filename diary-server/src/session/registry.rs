//! Session registry: cookie token → conversation session
//!
//! The registry owns the map from server-minted client identifiers to
//! sessions. Creation is atomic under the registry lock, so a burst of
//! identifier-less requests cannot race two sessions into existence for
//! the same slot. Each session sits behind its own `tokio::Mutex`,
//! giving at-most-one-in-flight mutating operation per session while
//! requests for different clients proceed independently; the registry
//! lock itself is only ever held for map access, never across an
//! oracle call.
//!
//! Sessions are bounded two ways: entries idle longer than the TTL are
//! dropped opportunistically on registry access, and when the capacity
//! bound is hit the least-recently-used entry is evicted. No background
//! task is involved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::state::ConversationSession;

/// Shared handle to one client's session
pub type SessionHandle = Arc<Mutex<ConversationSession>>;

struct SessionEntry {
    session: SessionHandle,
    last_seen: Instant,
}

/// Registry of live conversation sessions
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Resolve a client token to its session, creating one if needed
    ///
    /// An absent or unknown token mints a fresh server-assigned
    /// identifier; client-supplied identifiers are only trusted once
    /// the server has issued them. Returns `(client_id, session,
    /// created)`; `created` tells the caller to issue a cookie.
    pub async fn resolve_or_create(&self, token: Option<&str>) -> (String, SessionHandle, bool) {
        let mut sessions = self.sessions.lock().await;

        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.ttl);

        if let Some(token) = token {
            if let Some(entry) = sessions.get_mut(token) {
                entry.last_seen = Instant::now();
                return (token.to_string(), Arc::clone(&entry.session), false);
            }
        }

        // Capacity bound: drop the least-recently-used session.
        if sessions.len() >= self.capacity {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone())
            {
                tracing::warn!(client_id = %oldest, "Session capacity reached, evicting LRU session");
                sessions.remove(&oldest);
            }
        }

        let client_id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(ConversationSession::new(client_id.clone())));
        sessions.insert(
            client_id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );

        tracing::info!(client_id = %client_id, live_sessions = sessions.len(), "Session created");

        (client_id, session, true)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Duration::from_secs(3600), 1024)
    }

    #[tokio::test]
    async fn test_two_fresh_requests_get_distinct_sessions() {
        let registry = registry();

        let (id_a, session_a, created_a) = registry.resolve_or_create(None).await;
        let (id_b, session_b, created_b) = registry.resolve_or_create(None).await;

        assert!(created_a && created_b);
        assert_ne!(id_a, id_b);
        assert!(!Arc::ptr_eq(&session_a, &session_b));
        assert_eq!(registry.len().await, 2);

        // Both sessions start empty.
        assert_eq!(session_a.lock().await.turn_count(), 0);
        assert_eq!(session_b.lock().await.turn_count(), 0);
    }

    #[tokio::test]
    async fn test_known_token_returns_same_session() {
        let registry = registry();

        let (id, session, _) = registry.resolve_or_create(None).await;
        let (id_again, session_again, created) = registry.resolve_or_create(Some(&id)).await;

        assert!(!created);
        assert_eq!(id, id_again);
        assert!(Arc::ptr_eq(&session, &session_again));
    }

    #[tokio::test]
    async fn test_unknown_token_mints_new_identifier() {
        let registry = registry();

        let (id, _, created) = registry.resolve_or_create(Some("forged-token")).await;

        assert!(created);
        assert_ne!(id, "forged-token");
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let registry = SessionRegistry::new(Duration::from_millis(20), 1024);

        let (id, _, _) = registry.resolve_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        // Expired entry is dropped on the next access; the token now
        // resolves to a brand-new session.
        let (new_id, _, created) = registry.resolve_or_create(Some(&id)).await;
        assert!(created);
        assert_ne!(new_id, id);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let registry = SessionRegistry::new(Duration::from_secs(3600), 2);

        let (id_a, _, _) = registry.resolve_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (id_b, _, _) = registry.resolve_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Touch A so B becomes the LRU entry.
        registry.resolve_or_create(Some(&id_a)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let (_, _, created) = registry.resolve_or_create(None).await;
        assert!(created);
        assert_eq!(registry.len().await, 2);

        let (_, _, a_created) = registry.resolve_or_create(Some(&id_a)).await;
        assert!(!a_created, "recently used session should survive eviction");
        let (_, _, b_created) = registry.resolve_or_create(Some(&id_b)).await;
        assert!(b_created, "LRU session should have been evicted");
    }
}
