//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_conf_creates_total` (counter): create attempts by outcome
//! - `gateway_conf_updates_total` (counter): update attempts by outcome
//! - `gateway_conf_applies_total` (counter): apply attempts by outcome
//! - `gateway_conf_apply_duration_seconds` (histogram): reload latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_create(outcome: &'static str) {
    counter!("gateway_conf_creates_total", "outcome" => outcome).increment(1);
}

pub fn record_update(outcome: &'static str) {
    counter!("gateway_conf_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_apply(outcome: &'static str, elapsed: Duration) {
    counter!("gateway_conf_applies_total", "outcome" => outcome).increment(1);
    if !elapsed.is_zero() {
        histogram!("gateway_conf_apply_duration_seconds").record(elapsed.as_secs_f64());
    }
}
