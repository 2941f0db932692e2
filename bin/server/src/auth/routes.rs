//! Provider sign-in routes: start, callback and sign-out.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration as ChronoDuration;
use docsite_connect::{AuthorizationState, ConnectionFactory};
use docsite_core::SessionId;
use docsite_platform_access::{AuthenticationError, SecurityContext, Session};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;
use tracing::{info, warn};

use super::{POST_SIGN_IN_URL, SESSION_COOKIE, SIGN_IN_STATE_COOKIE, SIGN_IN_URL};
use crate::app::AppState;

/// How long a started handshake may take to come back.
const SIGN_IN_STATE_MINUTES: i64 = 10;

/// Query parameters of a provider callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Starts the handshake by redirecting to the provider.
pub async fn start_sign_in(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, SignInError> {
    let factory = connection_factory(&state, &provider)?;
    let (authorization_url, authorization_state) = factory.authorization_url();

    let state_json = serde_json::to_string(&authorization_state)
        .map_err(|e| SignInError::Internal(e.to_string()))?;

    let cookie = Cookie::build((SIGN_IN_STATE_COOKIE, state_json))
        .path(SIGN_IN_URL)
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(SIGN_IN_STATE_MINUTES));

    info!(provider = %provider, "starting provider sign-in");
    Ok((jar.add(cookie), Redirect::to(&authorization_url)))
}

/// Handles the provider's callback.
///
/// On success the user has a new session and is sent on to the sign-in
/// adapter's URL or the landing page.
pub async fn complete_sign_in(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, SignInError> {
    let factory = connection_factory(&state, &provider)?;

    if let Some(error) = query.error {
        return Err(SignInError::ProviderDenied {
            error,
            description: query.error_description,
        });
    }

    // Validate the state saved when the handshake started
    let saved_state: AuthorizationState = jar
        .get(SIGN_IN_STATE_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .ok_or(SignInError::MissingState)?;

    if query.state.as_deref() != Some(saved_state.csrf_token.as_str()) {
        return Err(SignInError::CsrfMismatch);
    }

    let code = query
        .code
        .ok_or_else(|| SignInError::Provider("callback carried no authorization code".into()))?;

    let connection = factory
        .complete(&code, &saved_state)
        .await
        .map_err(|e| SignInError::Provider(e.to_string()))?;

    let mut context = SecurityContext::default();
    let redirect = state.sign_in.sign_in(&connection, &mut context).await?;
    let authentication =
        context
            .take_authentication()
            .ok_or_else(|| AuthenticationError::IdentityResolution {
                provider: provider.clone(),
                reason: "sign-in adapter did not authenticate the user".to_string(),
            })?;

    // Create session
    let session_duration = state.session_config.duration_minutes;
    let session = Session::new(authentication, ChronoDuration::minutes(session_duration));
    let session_id = session.id();
    state.sessions.create(session).await;

    let session_cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(session_duration));

    let jar = jar.add(session_cookie).add(removal_cookie(
        SIGN_IN_STATE_COOKIE,
        SIGN_IN_URL,
    ));
    let location = redirect.unwrap_or_else(|| POST_SIGN_IN_URL.to_string());

    Ok((jar, Redirect::to(&location)))
}

/// Signs the user out by deleting their session.
pub async fn sign_out(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<SessionId>().ok())
    {
        if state.sessions.delete(&session_id).await {
            info!(session_id = %session_id, "signed out");
        }
    }

    (
        jar.add(removal_cookie(SESSION_COOKIE, "/")),
        Redirect::to(POST_SIGN_IN_URL),
    )
}

fn connection_factory(
    state: &AppState,
    provider: &str,
) -> Result<Arc<dyn ConnectionFactory>, SignInError> {
    state
        .sign_in
        .registry()
        .connection_factory(provider)
        .map_err(|_| SignInError::UnknownProvider(provider.to_string()))
}

fn removal_cookie(name: &'static str, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path(path)
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Sign-in errors.
///
/// Everything but an unknown provider sends the user back to the sign-in
/// page with an `error` code the page can explain.
#[derive(Debug)]
pub enum SignInError {
    UnknownProvider(String),
    ProviderDenied {
        error: String,
        description: Option<String>,
    },
    MissingState,
    CsrfMismatch,
    Provider(String),
    Authentication(AuthenticationError),
    Internal(String),
}

impl SignInError {
    /// The `error` query value shown on the sign-in page.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownProvider(_) => "unknown_provider",
            Self::ProviderDenied { .. } | Self::Provider(_) => "provider",
            Self::MissingState => "missing_state",
            Self::CsrfMismatch => "csrf",
            Self::Authentication(e) => e.code(),
            Self::Internal(_) => "internal",
        }
    }
}

impl From<AuthenticationError> for SignInError {
    fn from(e: AuthenticationError) -> Self {
        Self::Authentication(e)
    }
}

impl IntoResponse for SignInError {
    fn into_response(self) -> Response {
        match &self {
            Self::UnknownProvider(provider) => {
                return (
                    StatusCode::NOT_FOUND,
                    format!("Unknown sign-in provider: {provider}"),
                )
                    .into_response();
            }
            Self::ProviderDenied { error, description } => {
                warn!(error = %error, description = ?description, "provider refused sign-in");
            }
            Self::MissingState => warn!("sign-in callback without saved state"),
            Self::CsrfMismatch => warn!("sign-in callback state mismatch"),
            Self::Provider(details) => warn!(details = %details, "provider handshake failed"),
            Self::Authentication(e) => warn!(error = %e, "sign-in failed"),
            Self::Internal(details) => tracing::error!(details = %details, "sign-in error"),
        }

        let location = format!("{SIGN_IN_URL}?error={}", self.code());
        (
            CookieJar::new().add(removal_cookie(SIGN_IN_STATE_COOKIE, SIGN_IN_URL)),
            Redirect::to(&location),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(SignInError::MissingState.code(), "missing_state");
        assert_eq!(SignInError::CsrfMismatch.code(), "csrf");
        assert_eq!(SignInError::Provider("timeout".into()).code(), "provider");
        assert_eq!(
            SignInError::from(AuthenticationError::IdentityResolution {
                provider: "github".into(),
                reason: "no display name".into(),
            })
            .code(),
            "identity_resolution"
        );
        assert_eq!(
            SignInError::from(AuthenticationError::AmbiguousIdentity {
                provider: "github".into(),
                candidates: vec!["a".into(), "b".into()],
            })
            .code(),
            "multiple_users"
        );
    }

    #[test]
    fn sign_in_errors_redirect_to_sign_in_page() {
        let response = SignInError::CsrfMismatch.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[axum::http::header::LOCATION],
            "/signin?error=csrf"
        );
    }

    #[test]
    fn unknown_provider_is_not_found() {
        let response = SignInError::UnknownProvider("gitlab".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
