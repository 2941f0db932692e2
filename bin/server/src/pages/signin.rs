//! Sign-in page: the entry point for protected paths.

use axum::{
    extract::{Query, State},
    response::Response,
};
use maud::html;
use serde::Deserialize;
use std::sync::Arc;

use crate::app::AppState;

/// Query parameters of the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct SignInPageQuery {
    /// Error code from a failed sign-in attempt.
    error: Option<String>,
}

/// Explains a sign-in error code.
fn error_message(code: &str) -> &'static str {
    match code {
        "missing_state" => "Your sign-in attempt expired. Please try again.",
        "csrf" => "Your sign-in attempt could not be verified. Please try again.",
        "provider" => "The provider did not complete the sign-in.",
        "identity_resolution" => "Your provider account could not be matched to a user.",
        "multiple_users" => "Your provider account is linked to more than one user.",
        _ => "Sign-in failed.",
    }
}

/// Offers one sign-in button per registered provider.
pub async fn sign_in_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignInPageQuery>,
) -> Response {
    let providers = state.sign_in.registry().registered_provider_ids();

    let body = html! {
        h1 { "Sign in" }
        @if let Some(code) = &query.error {
            p class="error" { (error_message(code)) }
        }
        @for provider in &providers {
            form method="post" action={ "/signin/" (provider) } {
                button type="submit" { "Sign in with " (provider) }
            }
        }
    };

    state.pages.render("Sign in", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_messages() {
        assert!(error_message("identity_resolution").contains("could not be matched"));
        assert!(error_message("multiple_users").contains("more than one"));
        assert_eq!(error_message("<script>"), "Sign-in failed.");
    }
}
