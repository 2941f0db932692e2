//! Request-scoped security context.
//!
//! One context is created per request and travels with it (as an axum
//! request extension in the server). There is no process-wide holder.

use crate::authentication::Authentication;

/// The authentication state of the request being handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// Creates a context for an already-authenticated request.
    #[must_use]
    pub fn authenticated(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    /// Returns the current authentication, if any.
    #[must_use]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Replaces the current authentication.
    pub fn set_authentication(&mut self, authentication: Authentication) {
        self.authentication = Some(authentication);
    }

    /// Removes the current authentication, returning it.
    pub fn take_authentication(&mut self) -> Option<Authentication> {
        self.authentication.take()
    }

    /// Returns true if the request carries an authentication.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    /// Returns true if the request carries no authentication.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        !self.is_authenticated()
    }
}
