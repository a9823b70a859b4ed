//! Metrics collection and exposition.
//!
//! # Metrics
//! - `caller_info_requests_total` (counter): requests by route, status
//! - `caller_info_request_duration_seconds` (histogram): latency by route
//! - `caller_info_decisions_total` (counter): classifier outcomes by decision, reason
//!
//! Without an installed recorder every call is a no-op, so tests and the
//! CLI never need to set one up.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::classifier::AccessDecision;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!(
        "caller_info_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("caller_info_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_decision(decision: &AccessDecision) {
    let (outcome, reason) = match decision {
        AccessDecision::Allow(_) => ("allow", "none"),
        AccessDecision::Deny(denial) => ("deny", denial.reason.as_str()),
    };
    counter!(
        "caller_info_decisions_total",
        "decision" => outcome,
        "reason" => reason
    )
    .increment(1);
}
