//! OAuth routes
//!
//! Drives the handshake and turns its outcome into a redirect.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
    routing::get,
};

use super::middleware::CurrentSession;
use super::provider::CallbackParams;
use crate::AppState;
use crate::api::found;
use crate::eligibility::is_eligible;
use crate::error::{AuthFailure, Result};
use crate::metrics::{AUTH_FAILURES_TOTAL, HANDSHAKES_TOTAL};

/// Create authentication router
///
/// Routes:
/// - GET /auth - Redirect to the provider
/// - GET /auth/callback - OAuth callback
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(begin_authorization))
        .route("/auth/callback", get(complete_authorization))
}

/// GET /auth
///
/// Stores a fresh state in the session and redirects to the provider.
async fn begin_authorization(
    State(state): State<AppState>,
    mut session: CurrentSession,
) -> Response {
    let instruction = state.provider.begin_authorization(&mut session.record);
    session.persist(state.sessions.as_ref()).await;

    tracing::info!("Handshake started");
    found(instruction.location.as_str())
}

/// GET /auth/callback
///
/// # Steps
/// 1. Complete the handshake with the provider (an unparseable query
///    counts as a failed handshake)
/// 2. Evaluate eligibility of the returned profile
/// 3. Record the user in the session only when eligible
/// 4. Redirect to /ballot or /ineligible
async fn complete_authorization(
    State(state): State<AppState>,
    mut session: CurrentSession,
    query: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response> {
    let result = match query {
        Ok(Query(params)) => {
            state
                .provider
                .complete_authorization(&mut session.record, &params)
                .await
        }
        Err(rejection) => Err(AuthFailure::MalformedCallback(rejection.body_text())),
    };

    let profile = match result {
        Ok(profile) => profile,
        Err(failure) => {
            session.record.user = None;
            session.persist(state.sessions.as_ref()).await;

            HANDSHAKES_TOTAL.with_label_values(&["failed"]).inc();
            AUTH_FAILURES_TOTAL
                .with_label_values(&[failure.reason()])
                .inc();
            return Err(failure.into());
        }
    };

    let destination = if is_eligible(&profile) {
        tracing::info!(user = %profile.name, "Eligible account authenticated");
        HANDSHAKES_TOTAL.with_label_values(&["eligible"]).inc();
        session.record.user = Some(profile);
        "/ballot"
    } else {
        tracing::info!(
            user = %profile.name,
            created_utc = profile.created_utc,
            "Account created after cutoff"
        );
        HANDSHAKES_TOTAL.with_label_values(&["ineligible"]).inc();
        session.record.user = None;
        "/ineligible"
    };

    session.persist(state.sessions.as_ref()).await;
    Ok(found(destination))
}
