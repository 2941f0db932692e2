//! Platform access for the documentation site.
//!
//! This crate provides:
//! - Granted roles (`Role`, `RoleSet`)
//! - The authenticated principal (`Authentication`) and the request-scoped
//!   `SecurityContext` it lives in
//! - Server-side sessions (`Session`)
//! - Ordered, path-scoped authorization policies (`SecurityChain`)
//!
//! # Access Control Model
//!
//! Each request is checked against the chain's policies in ascending order.
//! The first policy whose path pattern matches decides:
//! - anonymous-only paths (the OAuth sign-in callback) reject signed-in users
//! - authenticated paths (the admin area) send anonymous users to the
//!   policy's entry point
//!
//! # Example
//!
//! ```
//! use docsite_platform_access::{
//!     AccessRule, Authentication, Decision, EntryPoint, SecurityChain, SecurityContext,
//!     SecurityPolicy,
//! };
//!
//! let chain = SecurityChain::builder()
//!     .policy(SecurityPolicy::new(i32::MAX - 1, "/signin/github", AccessRule::Anonymous).unwrap())
//!     .policy(
//!         SecurityPolicy::new(i32::MAX, "/admin/**", AccessRule::Authenticated)
//!             .unwrap()
//!             .with_entry_point(EntryPoint::login_url("/signin")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let anonymous = SecurityContext::default();
//! assert_eq!(
//!     chain.evaluate("/admin/projects", &anonymous),
//!     Decision::Redirect("/signin".to_string())
//! );
//!
//! let mut signed_in = SecurityContext::default();
//! signed_in.set_authentication(Authentication::user("alice").unwrap());
//! assert_eq!(chain.evaluate("/admin/projects", &signed_in), Decision::Permit);
//! ```

pub mod authentication;
pub mod chain;
pub mod context;
pub mod error;
pub mod role;
pub mod session;

// Re-export main types at crate root
pub use authentication::{Authentication, CREDENTIALS_PLACEHOLDER, Principal};
pub use chain::{
    AccessRule, Decision, EntryPoint, PathPattern, SecurityChain, SecurityChainBuilder,
    SecurityPolicy,
};
pub use context::SecurityContext;
pub use error::{AuthenticationError, ChainConfigError};
pub use role::{Role, RoleSet};
pub use session::Session;
