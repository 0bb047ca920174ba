//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_resolutions_total` (counter): resolutions by match kind
//! - `site_root_paths_cache_total` (counter): root path lookups by result (hit, miss, stale)
//! - `site_root_paths_invalidations_total` (counter): cache evictions
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(kind: &'static str) {
    counter!("site_resolutions_total", "match" => kind).increment(1);
}

pub fn record_root_paths_cache(result: &'static str) {
    counter!("site_root_paths_cache_total", "result" => result).increment(1);
}

pub fn record_root_paths_invalidation() {
    counter!("site_root_paths_invalidations_total").increment(1);
}
