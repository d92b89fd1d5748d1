//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Handshake Metrics
    pub static ref HANDSHAKES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("ballot_gate_handshakes_total", "Completed OAuth handshakes by outcome"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref AUTH_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("ballot_gate_auth_failures_total", "Failed OAuth handshakes by reason"),
        &["reason"]
    ).expect("metric can be created");

    // Session Metrics
    pub static ref SESSIONS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "ballot_gate_sessions_created_total",
        "Total number of sessions created"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("ballot_gate_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Safe to call more than once; later registrations are ignored.
pub fn init_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
        Box::new(HANDSHAKES_TOTAL.clone()),
        Box::new(AUTH_FAILURES_TOTAL.clone()),
        Box::new(SESSIONS_CREATED_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
    ];

    for collector in collectors {
        if let Err(error) = REGISTRY.register(collector) {
            tracing::debug!(%error, "Metric already registered");
        }
    }

    tracing::info!("Metrics registry initialized");
}
