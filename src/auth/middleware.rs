//! Session middleware
//!
//! Attaches a server-side session to every routed request, creating one
//! (and its cookie) on the first visit.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::session::{SessionId, SessionRecord, SessionStore};
use crate::AppState;
use crate::config::AppConfig;
use crate::error::AppError;

/// The session bound to the current request
///
/// Handlers own a copy of the record; changes only stick once
/// [`CurrentSession::persist`] is called.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    pub record: SessionRecord,
}

impl CurrentSession {
    pub async fn persist(self, sessions: &dyn SessionStore) {
        sessions.save(&self.id, self.record).await;
    }
}

fn session_cookie(config: &AppConfig, id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.session.cookie_name.clone(), id.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.server.is_https())
        .max_age(time::Duration::seconds(config.session.ttl_seconds))
        .build()
}

/// Middleware to load or create the visitor's session
///
/// The cookie is only issued when a session is created, so its
/// lifetime runs from creation and is never renewed.
///
/// # Usage
/// ```ignore
/// let routes = Router::new()
///     .route("/", ...)
///     .route_layer(middleware::from_fn_with_state(state, load_session));
/// ```
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = match jar.get(&state.config.session.cookie_name) {
        Some(cookie) => {
            let id = SessionId::from(cookie.value().to_owned());
            state
                .sessions
                .load(&id)
                .await
                .map(|record| CurrentSession { id, record })
        }
        None => None,
    };

    let (session, issued) = match existing {
        Some(session) => (session, None),
        None => {
            let (id, record) = state.sessions.create().await;
            let cookie = session_cookie(&state.config, &id);
            (CurrentSession { id, record }, Some(cookie))
        }
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    match issued {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session middleware not installed")))
    }
}
