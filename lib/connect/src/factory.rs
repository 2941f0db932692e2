//! Connection factory trait.
//!
//! A connection factory knows how to run the OAuth handshake against one
//! provider: it builds the authorization URL the browser is sent to, and it
//! turns the authorization code the provider sends back into a `Connection`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::error::ConnectError;

/// State created when a handshake starts and checked when it completes.
///
/// The server keeps this in a short-lived cookie between the two legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    /// CSRF token sent as the OAuth `state` parameter.
    pub csrf_token: String,
    /// PKCE code verifier matching the challenge sent to the provider.
    pub pkce_verifier: String,
}

/// One provider's side of the OAuth sign-in handshake.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// The provider id this factory is registered under, e.g. `github`.
    fn provider_id(&self) -> &str;

    /// Builds the URL to send the browser to, plus the state to keep for the
    /// callback.
    fn authorization_url(&self) -> (String, AuthorizationState);

    /// Exchanges the authorization code and loads the user's profile.
    async fn complete(
        &self,
        code: &str,
        state: &AuthorizationState,
    ) -> Result<Connection, ConnectError>;
}
