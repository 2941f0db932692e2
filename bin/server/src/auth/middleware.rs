//! Security chain middleware and authentication extractors for Axum.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use docsite_core::SessionId;
use docsite_platform_access::{Authentication, Decision, SecurityContext};
use std::sync::Arc;
use tracing::debug;

use super::{SESSION_COOKIE, SIGN_IN_URL};
use crate::app::AppState;

/// Runs every request through the security chain.
///
/// Loads the caller's session from the session cookie, asks the chain for a
/// decision on the request path and either short-circuits with the
/// rejection or hands the request on with its `SecurityContext` attached as
/// an extension.
pub async fn security_filter(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let context = load_security_context(&state, &jar).await;
    let decision = state.chain.evaluate(request.uri().path(), &context);

    match decision {
        Decision::Permit => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Decision::Redirect(location) => found(&location),
        Decision::Forbidden => (StatusCode::FORBIDDEN, "Access denied").into_response(),
        Decision::Unauthorized => {
            (StatusCode::UNAUTHORIZED, "Authentication required").into_response()
        }
    }
}

/// Builds the request's security context from its session cookie.
///
/// Missing, malformed, unknown and expired sessions all yield an anonymous
/// context. Expired sessions are deleted on sight.
async fn load_security_context(state: &AppState, jar: &CookieJar) -> SecurityContext {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SecurityContext::default();
    };
    let Ok(session_id) = cookie.value().parse::<SessionId>() else {
        debug!("ignoring malformed session cookie");
        return SecurityContext::default();
    };
    let Some(session) = state.sessions.find_by_id(&session_id).await else {
        return SecurityContext::default();
    };
    if session.is_expired() {
        state.sessions.delete(&session_id).await;
        debug!(session_id = %session_id, "session expired");
        return SecurityContext::default();
    }

    SecurityContext::authenticated(session.authentication().clone())
}

/// `302 Found` with a `Location` header.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Extractor for requiring an authenticated user.
///
/// If the user is not authenticated, they will be redirected to the sign-in
/// page.
pub struct RequireAuth(pub Authentication);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::authentication)
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::NotAuthenticated)
    }
}

/// Extractor for optionally getting the authenticated user.
///
/// Returns None if the user is not authenticated.
pub struct OptionalAuth(pub Option<Authentication>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match RequireAuth::from_request_parts(parts, state).await {
            Ok(RequireAuth(authentication)) => Ok(OptionalAuth(Some(authentication))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => found(SIGN_IN_URL),
        }
    }
}
