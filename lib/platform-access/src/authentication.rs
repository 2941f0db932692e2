//! The authenticated principal.
//!
//! An `Authentication` is what a successful sign-in produces and what the
//! security chain inspects on every request.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthenticationError;
use crate::role::RoleSet;

/// Credentials recorded for externally authenticated users.
///
/// The provider holds the real credentials; nothing is kept locally.
pub const CREDENTIALS_PLACEHOLDER: &str = "N/A";

/// A local user identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Creates a principal from a local user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError::IdentityResolution` if the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, AuthenticationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AuthenticationError::IdentityResolution {
                provider: "local".to_string(),
                reason: "principal must not be empty".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Returns the principal as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = AuthenticationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

/// A completed authentication: who, with what credentials, granted which roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    principal: Principal,
    credentials: String,
    roles: RoleSet,
}

impl Authentication {
    /// Creates an authentication.
    #[must_use]
    pub fn new(principal: Principal, credentials: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            principal,
            credentials: credentials.into(),
            roles,
        }
    }

    /// Authentication of a user signed in through an external provider:
    /// placeholder credentials and `{ROLE_USER}`.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError::IdentityResolution` if `user_id` is blank.
    pub fn user(user_id: impl Into<String>) -> Result<Self, AuthenticationError> {
        Ok(Self::new(
            Principal::new(user_id)?,
            CREDENTIALS_PLACEHOLDER,
            RoleSet::user(),
        ))
    }

    /// Returns the principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the recorded credentials.
    #[must_use]
    pub fn credentials(&self) -> &str {
        &self.credentials
    }

    /// Returns the granted roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn user_authentication_has_placeholder_and_role_user() {
        let auth = Authentication::user("Alice").expect("valid principal");
        assert_eq!(auth.principal().as_str(), "Alice");
        assert_eq!(auth.credentials(), CREDENTIALS_PLACEHOLDER);
        assert_eq!(auth.roles(), &RoleSet::user());
        assert!(auth.roles().contains(&Role::user()));
    }

    #[test]
    fn blank_principal_is_rejected() {
        let err = Authentication::user("   ").expect_err("blank principal");
        assert_eq!(err.code(), "identity_resolution");
    }

    #[test]
    fn principal_deserialization_rejects_empty() {
        let result: Result<Principal, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn authentication_serialization_roundtrip() {
        let auth = Authentication::user("alice").expect("valid principal");
        let json = serde_json::to_string(&auth).expect("serialize");
        let parsed: Authentication = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(auth, parsed);
    }
}
