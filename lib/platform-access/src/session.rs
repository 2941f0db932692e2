//! Server-side sessions.
//!
//! A session keeps an `Authentication` alive between requests. It is created
//! when a sign-in completes and is looked up from the session cookie on every
//! subsequent request.

use chrono::{DateTime, Duration, Utc};
use docsite_core::SessionId;
use serde::{Deserialize, Serialize};

use crate::authentication::Authentication;

/// An authenticated session with a fixed expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    authentication: Authentication,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session that is valid for the given duration.
    #[must_use]
    pub fn new(authentication: Authentication, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            authentication,
            created_at: now,
            expires_at: now + duration,
        }
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the authentication held by this session.
    #[must_use]
    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Authentication {
        Authentication::user("alice").expect("valid principal")
    }

    #[test]
    fn new_session_has_correct_fields() {
        let before = Utc::now();
        let session = Session::new(alice(), Duration::hours(1));
        let after = Utc::now();

        assert_eq!(session.authentication(), &alice());
        assert!(session.created_at() >= before);
        assert!(session.created_at() <= after);
        assert!(session.expires_at() > session.created_at());
        assert!(!session.is_expired());
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let a = Session::new(alice(), Duration::hours(1));
        let b = Session::new(alice(), Duration::hours(1));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn session_expiration() {
        let session = Session::new(alice(), Duration::seconds(-1));
        assert!(session.is_expired());
    }
}
