//! Ballot Gate - admits Reddit accounts created before a fixed cutoff
//!
//! # Flow
//!
//! ```text
//!  GET /  ──▶  GET /auth  ──▶  Reddit consent  ──▶  GET /auth/callback
//!                                                        │
//!                              eligible ◀────────────────┴────────▶ ineligible / failed
//!                                 │                                        │
//!                            GET /ballot                            GET /ineligible
//! ```
//!
//! # Modules
//!
//! - `api`: page handlers and the metrics endpoint
//! - `auth`: OAuth provider, handshake routes, sessions
//! - `eligibility`: the account-age policy
//! - `views`: HTML templates
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod metrics;
pub mod views;

use std::sync::Arc;

use auth::{MemorySessionStore, OAuthProvider, RedditProvider, SessionStore};

/// Application state shared across all handlers
///
/// Cloned for each request; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Server-side session records
    pub sessions: Arc<dyn SessionStore>,

    /// OAuth provider used for the handshake
    pub provider: Arc<dyn OAuthProvider>,
}

impl AppState {
    /// Initialize application state with the in-memory session store
    /// and the Reddit provider
    ///
    /// # Errors
    /// Returns error if the HTTP client or provider cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let http_client = reqwest::Client::builder()
            .user_agent(config.reddit.user_agent.clone())
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let provider = RedditProvider::new(&config.reddit, &config.server, http_client)?;
        let sessions = MemorySessionStore::new(
            chrono::Duration::seconds(config.session.ttl_seconds),
            config.session.max_sessions,
        );

        Ok(Self::with_components(
            config,
            Arc::new(sessions),
            Arc::new(provider),
        ))
    }

    /// Assemble state from explicit components
    pub fn with_components(
        config: config::AppConfig,
        sessions: Arc<dyn SessionStore>,
        provider: Arc<dyn OAuthProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            provider,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::handler::HandlerWithoutStateExt;
    use axum::{Router, middleware};
    use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

    let static_files = ServeDir::new(&state.config.server.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(api::not_found.into_service());

    Router::new()
        .merge(api::pages_router())
        .merge(auth::auth_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_session,
        ))
        .merge(api::metrics_router())
        .fallback_service(static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
