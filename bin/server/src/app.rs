//! Shared application state and the HTTP router.

use axum::{
    Router, middleware,
    routing::get,
};
use docsite_connect::{GitHubApi, SignInService};
use docsite_documentation::DocumentationService;
use docsite_platform_access::SecurityChain;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::{self, SessionRepository};
use crate::config::SessionConfig;
use crate::pages::{self, Pages};

/// Shared application state.
pub struct AppState {
    /// Provider sign-in: factories, user mapping and sign-in adapter.
    pub sign_in: SignInService,
    /// GitHub REST API client using the site's token.
    pub github_api: GitHubApi,
    /// Active sessions.
    pub sessions: SessionRepository,
    /// Path-scoped access policies.
    pub chain: SecurityChain,
    /// Documentation projects bound at startup.
    pub documentation: DocumentationService,
    /// Page renderer.
    pub pages: Pages,
    /// Session configuration.
    pub session_config: SessionConfig,
}

/// Builds the router.
///
/// Every route, including the fallback, sits behind the security chain.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::home_page))
        .route("/signin", get(pages::sign_in_page))
        .route(
            "/signin/{provider}",
            get(auth::complete_sign_in).post(auth::start_sign_in),
        )
        .route("/signout", get(auth::sign_out))
        .route("/admin", get(pages::admin_page))
        .route("/admin/", get(pages::admin_page))
        .route("/admin/{*path}", get(pages::admin_page))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::security_filter,
                )),
        )
        .with_state(state)
}
