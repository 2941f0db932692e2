//! Social sign-in for the documentation site.
//!
//! This crate connects local users to accounts at external OAuth providers:
//! - `ConnectionFactory`: one provider's OAuth handshake (`GitHubConnectionFactory`)
//! - `ConnectionFactoryRegistry`: the providers registered at startup, one
//!   factory per provider
//! - `InMemoryUsersConnectionRepository`: which local user owns which
//!   external account, with a sign-up strategy for first-time visitors
//! - `SignInService`: turns a completed connection into an authenticated
//!   `SecurityContext`
//! - `GitHubApi`: server-side REST calls with the site's own API token
//!
//! The HTTP side of the handshake (redirects, cookies) lives in the server.

pub mod api;
pub mod connection;
pub mod error;
pub mod factory;
pub mod github;
pub mod registry;
pub mod repository;
pub mod signin;

pub use api::{GitHubApi, GitHubRepository};
pub use connection::{Connection, ConnectionKey};
pub use error::ConnectError;
pub use factory::{AuthorizationState, ConnectionFactory};
pub use github::{GitHubConfig, GitHubConnectionFactory};
pub use registry::ConnectionFactoryRegistry;
pub use repository::{ConnectionSignUp, InMemoryUsersConnectionRepository, display_name_sign_up};
pub use signin::{SignInAdapter, SignInService, user_role_sign_in};
