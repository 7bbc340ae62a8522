//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by kind (forward/tunnel) and status
//! - `proxy_request_duration_seconds` (histogram): time to response head, by kind
//! - `proxy_active_tunnels` (gauge): tunnels currently relaying
//! - `proxy_tunnel_bytes_total` (counter): tunneled bytes by direction

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::net::relay::{Direction, RelayStats};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request head.
pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    metrics::counter!("proxy_requests_total", "kind" => kind, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn tunnel_opened() {
    metrics::gauge!("proxy_active_tunnels").increment(1.0);
}

/// Record a finished tunnel and its byte counts.
pub fn tunnel_closed(stats: &RelayStats) {
    metrics::gauge!("proxy_active_tunnels").decrement(1.0);
    metrics::counter!("proxy_tunnel_bytes_total", "direction" => Direction::ClientToUpstream.as_str())
        .increment(stats.client_to_upstream);
    metrics::counter!("proxy_tunnel_bytes_total", "direction" => Direction::UpstreamToClient.as_str())
        .increment(stats.upstream_to_client);
}
