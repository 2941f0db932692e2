//! Admin area.

use axum::{extract::State, http::Uri, response::Response};
use maud::html;
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::RequireAuth;

/// Shows the signed-in user and the bound project metadata.
pub async fn admin_page(
    State(state): State<Arc<AppState>>,
    RequireAuth(authentication): RequireAuth,
    uri: Uri,
) -> Response {
    let roles = authentication
        .roles()
        .iter()
        .map(|r| r.authority())
        .collect::<Vec<_>>()
        .join(", ");

    let body = html! {
        h1 { "Administration" }
        p {
            "Signed in as " strong { (authentication.principal().as_str()) }
            " (" (roles) "). "
            a href="/signout" { "Sign out" }
        }
        p class="path" { (uri.path()) }
        p class="github-api" {
            "GitHub API: "
            @if state.github_api.is_authenticated() { "authenticated" } @else { "anonymous" }
        }
        table {
            tr { th { "Id" } th { "Name" } th { "Order" } th { "Repository" } }
            @for (id, project) in state.documentation.projects() {
                tr {
                    td { (id) }
                    td { (project.name.as_deref().unwrap_or("")) }
                    td {
                        @if let Some(order) = project.sort_order {
                            (order)
                        }
                    }
                    td { (project.repository.as_deref().unwrap_or("")) }
                }
            }
        }
    };

    state.pages.render("Admin", body)
}
