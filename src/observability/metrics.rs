//! Metrics collection and exposition.
//!
//! # Metrics
//! - `affiliate_rewrites_total` (counter): rewrites by merchant key
//! - `affiliate_decisions_total` (counter): every decision by outcome
//! - `redirect_requests_total` (counter): short-link requests by status

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_rewrite(merchant: &str) {
    metrics::counter!("affiliate_rewrites_total", "merchant" => merchant.to_string()).increment(1);
    record_decision("rewritten");
}

pub fn record_decision(outcome: &'static str) {
    metrics::counter!("affiliate_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_request(status: u16) {
    metrics::counter!("redirect_requests_total", "status" => status.to_string()).increment(1);
}
