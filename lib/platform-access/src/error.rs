//! Error types for the platform-access crate.
//!
//! - `AuthenticationError`: failures establishing who the caller is
//! - `ChainConfigError`: security chains that cannot be composed

use std::fmt;

/// Errors from authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// No local user identity could be derived from an external connection.
    ///
    /// Raised instead of authenticating with an empty principal.
    IdentityResolution { provider: String, reason: String },
    /// More than one local user is linked to the same external account.
    AmbiguousIdentity {
        provider: String,
        candidates: Vec<String>,
    },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityResolution { provider, reason } => {
                write!(f, "could not resolve a local identity from '{provider}': {reason}")
            }
            Self::AmbiguousIdentity {
                provider,
                candidates,
            } => {
                write!(
                    f,
                    "'{provider}' connection is linked to {} local users",
                    candidates.len()
                )
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

impl AuthenticationError {
    /// Short machine-readable code used in sign-in error redirects.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdentityResolution { .. } => "identity_resolution",
            Self::AmbiguousIdentity { .. } => "multiple_users",
        }
    }
}

/// Errors raised while composing a security chain.
///
/// These are startup-time failures: a chain that builds successfully never
/// fails while evaluating requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainConfigError {
    /// Two policies were declared with the same order.
    DuplicateOrder {
        order: i32,
        first: String,
        second: String,
    },
    /// A path pattern could not be parsed.
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for ChainConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateOrder {
                order,
                first,
                second,
            } => {
                write!(
                    f,
                    "policies '{first}' and '{second}' share order {order}"
                )
            }
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "invalid path pattern '{pattern}': {reason}")
            }
        }
    }
}

impl std::error::Error for ChainConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_resolution_display() {
        let err = AuthenticationError::IdentityResolution {
            provider: "github".to_string(),
            reason: "connection has no display name".to_string(),
        };
        assert!(err.to_string().contains("github"));
        assert!(err.to_string().contains("no display name"));
        assert_eq!(err.code(), "identity_resolution");
    }

    #[test]
    fn ambiguous_identity_code() {
        let err = AuthenticationError::AmbiguousIdentity {
            provider: "github".to_string(),
            candidates: vec!["alice".to_string(), "alice-admin".to_string()],
        };
        assert_eq!(err.code(), "multiple_users");
        assert!(err.to_string().contains("2 local users"));
    }

    #[test]
    fn duplicate_order_display() {
        let err = ChainConfigError::DuplicateOrder {
            order: 7,
            first: "/signin/github".to_string(),
            second: "/admin/**".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/signin/github"));
        assert!(message.contains("/admin/**"));
        assert!(message.contains('7'));
    }
}
