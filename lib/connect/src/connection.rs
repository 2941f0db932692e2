//! The result of a completed provider handshake.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an external account: provider plus the provider's user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionKey {
    provider_id: String,
    provider_user_id: String,
}

impl ConnectionKey {
    /// Creates a connection key.
    #[must_use]
    pub fn new(provider_id: impl Into<String>, provider_user_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_user_id: provider_user_id.into(),
        }
    }

    /// Returns the provider id, e.g. `github`.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Returns the user's id at the provider.
    #[must_use]
    pub fn provider_user_id(&self) -> &str {
        &self.provider_user_id
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_id, self.provider_user_id)
    }
}

/// A live connection to a user's account at an external provider.
///
/// Connections are consumed once by the sign-in flow and are not persisted;
/// only the `ConnectionKey` → local user mapping outlives the request.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    key: ConnectionKey,
    display_name: Option<String>,
    profile_url: Option<String>,
    image_url: Option<String>,
    access_token: String,
}

impl Connection {
    /// Creates a connection with no profile data.
    #[must_use]
    pub fn new(key: ConnectionKey, access_token: impl Into<String>) -> Self {
        Self {
            key,
            display_name: None,
            profile_url: None,
            image_url: None,
            access_token: access_token.into(),
        }
    }

    /// Sets the display name reported by the provider.
    #[must_use]
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    /// Sets the profile page URL.
    #[must_use]
    pub fn with_profile_url(mut self, profile_url: Option<String>) -> Self {
        self.profile_url = profile_url;
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// Returns the connection key.
    #[must_use]
    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    /// Returns the provider's display name for the user, if it sent one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the profile page URL, if known.
    #[must_use]
    pub fn profile_url(&self) -> Option<&str> {
        self.profile_url.as_deref()
    }

    /// Returns the avatar URL, if known.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Returns the access token granted by the provider.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("profile_url", &self.profile_url)
            .field("image_url", &self.image_url)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_key_display() {
        let key = ConnectionKey::new("github", "583231");
        assert_eq!(key.to_string(), "github:583231");
    }

    #[test]
    fn connection_builder() {
        let connection = Connection::new(ConnectionKey::new("github", "1"), "token")
            .with_display_name(Some("octocat".to_string()))
            .with_profile_url(Some("https://github.com/octocat".to_string()));

        assert_eq!(connection.display_name(), Some("octocat"));
        assert_eq!(connection.profile_url(), Some("https://github.com/octocat"));
        assert!(connection.image_url().is_none());
        assert_eq!(connection.access_token(), "token");
    }

    #[test]
    fn debug_output_redacts_access_token() {
        let connection = Connection::new(ConnectionKey::new("github", "1"), "gho_secret");
        let debug = format!("{connection:?}");
        assert!(!debug.contains("gho_secret"));
        assert!(debug.contains("[redacted]"));
    }
}
