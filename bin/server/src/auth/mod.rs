//! Authentication for the documentation site.
//!
//! This module provides:
//! - Provider sign-in routes (`/signin/{provider}`, `/signout`)
//! - An in-memory session store
//! - The security chain middleware and authentication extractors
//!
//! # Access Control Model
//!
//! Every request passes through `security_filter`, which evaluates the
//! application's `SecurityChain` against the request path:
//! - `/signin/github` is anonymous-only: signed-in users get `403`
//! - `/admin` and everything below it needs a session: anonymous users are
//!   redirected to `/signin`
//! - all other paths are open
//!
//! The filter attaches the request's `SecurityContext` as an extension;
//! handlers read it through `RequireAuth` and `OptionalAuth`.

pub mod middleware;
pub mod routes;
pub mod sessions;

pub use middleware::{AuthRejection, OptionalAuth, RequireAuth, security_filter};
pub use routes::{SignInError, complete_sign_in, sign_out, start_sign_in};
pub use sessions::SessionRepository;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Cookie holding the CSRF token and PKCE verifier between the two legs of a
/// provider handshake.
pub const SIGN_IN_STATE_COOKIE: &str = "signin_state";

/// The sign-in page, and the entry point for protected paths.
pub const SIGN_IN_URL: &str = "/signin";

/// Where users land after signing in or out.
pub const POST_SIGN_IN_URL: &str = "/";
