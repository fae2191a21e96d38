//! Metrics collection and exposition.
//!
//! # Metrics
//! - `carrier_route_lookups_total` (counter): routing decisions by domain, outcome;
//!   domains absent from the live snapshot share the `unknown` label
//! - `carrier_route_reloads_total` (counter): reload attempts by result
//! - `carrier_route_snapshot_generation` (gauge): generation of the live snapshot

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::routing::router::{NoRouteReason, RouteOutcome};

/// Domain label for lookups that never reached a configured domain.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Labels for one routing decision.
///
/// The domain comes from the caller; it is only used as a label once the
/// snapshot has resolved it, which bounds the label set to configured
/// domains.
pub fn lookup_labels<'a>(domain: &'a str, outcome: &RouteOutcome) -> (&'a str, &'static str) {
    match outcome {
        RouteOutcome::Routed(_) => (domain, "routed"),
        RouteOutcome::NoRoute {
            reason: reason @ (NoRouteReason::UnknownCarrier | NoRouteReason::UnknownDomain),
        } => (UNKNOWN_DOMAIN, reason.as_str()),
        RouteOutcome::NoRoute { reason } => (domain, reason.as_str()),
    }
}

/// Record one routing decision.
pub fn record_lookup(domain: &str, outcome: &RouteOutcome) {
    let (domain, outcome) = lookup_labels(domain, outcome);
    metrics::counter!(
        "carrier_route_lookups_total",
        "domain" => domain.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("carrier_route_reloads_total", "result" => result).increment(1);
}

/// Track the generation of the live snapshot.
pub fn set_generation(generation: u64) {
    metrics::gauge!("carrier_route_snapshot_generation").set(generation as f64);
}
