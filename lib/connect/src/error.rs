//! Error types for provider connections.

use std::fmt;

/// Errors from connection factories and the factory registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// A factory for this provider is already registered.
    DuplicateProvider { provider: String },
    /// No factory is registered for this provider.
    UnknownProvider { provider: String },
    /// The factory's configuration is unusable (bad URL, HTTP client setup).
    Configuration { provider: String, details: String },
    /// Exchanging the authorization code for an access token failed.
    TokenExchange { provider: String, details: String },
    /// Fetching the user's profile from the provider failed.
    Profile { provider: String, details: String },
    /// A REST API call to the provider failed.
    Api { provider: String, details: String },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateProvider { provider } => {
                write!(f, "a connection factory for '{provider}' is already registered")
            }
            Self::UnknownProvider { provider } => {
                write!(f, "no connection factory registered for '{provider}'")
            }
            Self::Configuration { provider, details } => {
                write!(f, "'{provider}' connection factory misconfigured: {details}")
            }
            Self::TokenExchange { provider, details } => {
                write!(f, "'{provider}' token exchange failed: {details}")
            }
            Self::Profile { provider, details } => {
                write!(f, "failed to fetch '{provider}' profile: {details}")
            }
            Self::Api { provider, details } => {
                write!(f, "'{provider}' API call failed: {details}")
            }
        }
    }
}

impl std::error::Error for ConnectError {}
