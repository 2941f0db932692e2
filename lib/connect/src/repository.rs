//! Mapping from external accounts to local users.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::connection::{Connection, ConnectionKey};

/// Creates a local user for a connection nobody has used before.
///
/// Returns the new local user id, or `None` to decline the sign-up.
pub type ConnectionSignUp = Arc<dyn Fn(&Connection) -> Option<String> + Send + Sync>;

/// Sign-up strategy that uses the provider's display name as the local
/// user id.
///
/// Declines when the provider sent no display name or a blank one.
#[must_use]
pub fn display_name_sign_up() -> ConnectionSignUp {
    Arc::new(|connection: &Connection| {
        connection
            .display_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
    })
}

/// In-memory store of which local users own which external accounts.
///
/// Nothing is persisted; the mapping is rebuilt from sign-ups after a
/// restart.
pub struct InMemoryUsersConnectionRepository {
    connections: RwLock<HashMap<ConnectionKey, Vec<String>>>,
    sign_up: Option<ConnectionSignUp>,
}

impl InMemoryUsersConnectionRepository {
    /// Creates a repository that never signs up new users.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            sign_up: None,
        }
    }

    /// Creates a repository that signs up unknown connections with `sign_up`.
    #[must_use]
    pub fn with_sign_up(sign_up: ConnectionSignUp) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            sign_up: Some(sign_up),
        }
    }

    /// Returns the local user ids mapped to this connection.
    ///
    /// When none are mapped and a sign-up strategy is configured, the strategy
    /// runs once and its user is recorded. An empty result means the
    /// connection could not be resolved to anyone.
    pub async fn find_user_ids_with_connection(&self, connection: &Connection) -> Vec<String> {
        {
            let connections = self.connections.read().await;
            if let Some(user_ids) = connections.get(connection.key()) {
                if !user_ids.is_empty() {
                    return user_ids.clone();
                }
            }
        }

        let Some(sign_up) = &self.sign_up else {
            return Vec::new();
        };

        let mut connections = self.connections.write().await;
        // Another request may have signed this connection up meanwhile.
        if let Some(user_ids) = connections.get(connection.key()) {
            if !user_ids.is_empty() {
                return user_ids.clone();
            }
        }

        match sign_up(connection) {
            Some(user_id) => {
                info!(user_id = %user_id, connection = %connection.key(), "signed up new user");
                connections.insert(connection.key().clone(), vec![user_id.clone()]);
                vec![user_id]
            }
            None => Vec::new(),
        }
    }

    /// Maps a connection to a local user.
    pub async fn add_connection(&self, user_id: &str, connection: &Connection) {
        let mut connections = self.connections.write().await;
        let user_ids = connections.entry(connection.key().clone()).or_default();
        if !user_ids.iter().any(|existing| existing == user_id) {
            user_ids.push(user_id.to_string());
        }
    }
}

impl Default for InMemoryUsersConnectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(display_name: Option<&str>) -> Connection {
        Connection::new(ConnectionKey::new("github", "42"), "token")
            .with_display_name(display_name.map(ToString::to_string))
    }

    #[tokio::test]
    async fn sign_up_uses_display_name() {
        let repo = InMemoryUsersConnectionRepository::with_sign_up(display_name_sign_up());
        let ids = repo
            .find_user_ids_with_connection(&connection(Some("Alice")))
            .await;
        assert_eq!(ids, vec!["Alice"]);
    }

    #[tokio::test]
    async fn signed_up_user_is_remembered() {
        let repo = InMemoryUsersConnectionRepository::with_sign_up(display_name_sign_up());
        repo.find_user_ids_with_connection(&connection(Some("Alice")))
            .await;

        // Same account, new display name: still the original user.
        let ids = repo
            .find_user_ids_with_connection(&connection(Some("alice-renamed")))
            .await;
        assert_eq!(ids, vec!["Alice"]);
    }

    #[tokio::test]
    async fn missing_display_name_declines_sign_up() {
        let repo = InMemoryUsersConnectionRepository::with_sign_up(display_name_sign_up());
        assert!(
            repo.find_user_ids_with_connection(&connection(None))
                .await
                .is_empty()
        );
        assert!(
            repo.find_user_ids_with_connection(&connection(Some("   ")))
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn without_sign_up_unknown_connections_resolve_to_nobody() {
        let repo = InMemoryUsersConnectionRepository::new();
        assert!(
            repo.find_user_ids_with_connection(&connection(Some("Alice")))
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn added_connections_accumulate_distinct_users() {
        let repo = InMemoryUsersConnectionRepository::new();
        let conn = connection(Some("Alice"));
        repo.add_connection("alice", &conn).await;
        repo.add_connection("bob", &conn).await;
        repo.add_connection("alice", &conn).await;

        assert_eq!(
            repo.find_user_ids_with_connection(&conn).await,
            vec!["alice", "bob"]
        );
    }
}
