//! In-memory session store.

use docsite_core::SessionId;
use docsite_platform_access::Session;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Sessions keyed by id.
///
/// Sessions do not survive a restart; signing in again is cheap.
#[derive(Debug, Default)]
pub struct SessionRepository {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a session by ID. Expired sessions are still returned; callers
    /// check `Session::is_expired`.
    pub async fn find_by_id(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Stores a new session.
    pub async fn create(&self, session: Session) {
        self.sessions.write().await.insert(session.id(), session);
    }

    /// Deletes a session by ID (sign-out). Returns whether it existed.
    pub async fn delete(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Deletes expired sessions, returning how many were removed.
    pub async fn delete_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use docsite_platform_access::Authentication;

    fn session(duration: Duration) -> Session {
        Session::new(Authentication::user("alice").expect("valid user"), duration)
    }

    #[tokio::test]
    async fn create_find_delete() {
        let repo = SessionRepository::new();
        let session = session(Duration::minutes(5));
        let id = session.id();

        repo.create(session.clone()).await;
        assert_eq!(repo.find_by_id(&id).await, Some(session));

        assert!(repo.delete(&id).await);
        assert!(repo.find_by_id(&id).await.is_none());
        assert!(!repo.delete(&id).await);
    }

    #[tokio::test]
    async fn delete_expired_keeps_live_sessions() {
        let repo = SessionRepository::new();
        let live = session(Duration::minutes(5));
        let live_id = live.id();
        repo.create(live).await;
        repo.create(session(Duration::minutes(-1))).await;

        assert_eq!(repo.delete_expired().await, 1);
        assert_eq!(repo.len().await, 1);
        assert!(repo.find_by_id(&live_id).await.is_some());
    }
}
