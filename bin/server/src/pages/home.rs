//! Landing page.

use axum::{extract::State, response::Response};
use maud::html;
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::OptionalAuth;

/// Lists the documentation projects and greets signed-in users.
pub async fn home_page(
    State(state): State<Arc<AppState>>,
    OptionalAuth(authentication): OptionalAuth,
) -> Response {
    let projects = state.documentation.projects();

    let body = html! {
        @match &authentication {
            Some(authentication) => {
                p {
                    "Signed in as " strong { (authentication.principal().as_str()) } ". "
                    a href="/admin" { "Admin" } " | " a href="/signout" { "Sign out" }
                }
            },
            None => {
                p { a href="/signin" { "Sign in" } }
            },
        }

        h1 { "Projects" }
        @if projects.is_empty() {
            p { "No documentation projects are configured." }
        } @else {
            ul class="projects" {
                @for &(id, project) in &projects {
                    @let name = project.name.as_deref().unwrap_or(id);
                    li {
                        @if let Some(url) = &project.site_url {
                            a href=(url) { (name) }
                        } @else {
                            (name)
                        }
                    }
                }
            }
        }
    };

    state.pages.render("Home", body)
}
