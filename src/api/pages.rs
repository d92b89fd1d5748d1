//! Pages
//!
//! The entry page, the protected ballot page, the denial page and
//! the 404 page.

use axum::{
    Router,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use super::found;
use crate::AppState;
use crate::auth::CurrentSession;
use crate::error::AppError;
use crate::views::{Template, render};

/// Create page router
///
/// Routes:
/// - GET / - Entry page
/// - GET /ballot - Ballot (eligible users only)
/// - GET /ineligible - Denial page
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/ballot", get(ballot))
        .route("/ineligible", get(ineligible))
}

/// GET /
async fn index() -> Html<String> {
    Html(render(
        Template::Index,
        &[
            ("title", "Welcome to Reddit Auth App"),
            ("desc", "Authenticate with Reddit to proceed."),
            ("button_text", "Continue with Reddit"),
            ("auth_url", "/auth"),
        ],
    ))
}

/// GET /ballot
///
/// Anonymous visitors are sent back to the entry page.
async fn ballot(session: CurrentSession) -> Response {
    match &session.record.user {
        Some(user) => {
            Html(render(Template::Ballot, &[("username", user.name.as_str())])).into_response()
        }
        None => found("/"),
    }
}

/// GET /ineligible
async fn ineligible() -> Html<String> {
    Html(render(
        Template::Ineligible,
        &[
            ("title", "Access Denied"),
            ("desc", "You are ineligible to proceed further."),
            ("button_text", "Go Back to Home"),
        ],
    ))
}

/// Fallback for anything no route or static file matched
pub async fn not_found() -> AppError {
    AppError::NotFound
}
