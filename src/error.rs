//! Error types for Ballot Gate
//!
//! Request handlers return `AppError`, which implements `IntoResponse`
//! so that every failure ends up as a rendered page rather than a raw
//! error. Handshake problems are modelled separately as `AuthFailure`.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::views::{self, Template};

/// Reasons an OAuth handshake can fail
///
/// None of these are shown to the visitor; the controller routes
/// every one of them to the ineligible page.
#[derive(Debug, Error)]
pub enum AuthFailure {
    /// The session has no pending handshake
    #[error("no authorization is pending for this session")]
    MissingState,

    /// Returned state does not match the one stored in the session
    #[error("state parameter does not match the session")]
    StateMismatch,

    /// Provider redirected back with an `error` parameter
    #[error("provider denied authorization: {0}")]
    ProviderDenied(String),

    /// Callback query string could not be parsed
    #[error("malformed callback query: {0}")]
    MalformedCallback(String),

    /// Callback arrived without an authorization code
    #[error("authorization code missing from callback")]
    MissingCode,

    /// Code exchange was rejected by the provider
    #[error("token exchange rejected: {0}")]
    TokenExchange(String),

    /// Profile lookup was rejected by the provider
    #[error("profile fetch rejected: {0}")]
    ProfileFetch(String),

    /// Transport-level failure talking to the provider
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AuthFailure {
    /// Short label used for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingState => "missing_state",
            AuthFailure::StateMismatch => "state_mismatch",
            AuthFailure::ProviderDenied(_) => "provider_denied",
            AuthFailure::MalformedCallback(_) => "malformed_callback",
            AuthFailure::MissingCode => "missing_code",
            AuthFailure::TokenExchange(_) => "token_exchange",
            AuthFailure::ProfileFetch(_) => "profile_fetch",
            AuthFailure::Network(_) => "network",
        }
    }
}

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// No route matched (404)
    #[error("Page not found")]
    NotFound,

    /// Missing or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Handshake failure (redirects to the ineligible page)
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// HTTP client could not be built or used (500)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::Config(_) => "config",
            AppError::Auth(_) => "auth",
            AppError::HttpClient(_) => "http_client",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Not-found renders the 404 page, handshake failures redirect to
    /// `/ineligible`, and everything else becomes a bare 500 page.
    fn into_response(self) -> Response {
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(views::render(Template::NotFound, &[("message", "Page Not Found")])),
            )
                .into_response(),
            AppError::Auth(failure) => {
                tracing::info!(reason = failure.reason(), error = %failure, "Handshake failed");
                crate::api::found("/ineligible")
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::render(Template::Error, &[])),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
