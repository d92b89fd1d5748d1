//! HTTP layer
//!
//! Handlers for:
//! - Pages (entry, ballot, ineligible, 404)
//! - Metrics (Prometheus)

pub mod metrics;
mod pages;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

pub use metrics::metrics_router;
pub use pages::{not_found, pages_router};

/// `302 Found` redirect to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
