//! Metrics collection and exposition.
//!
//! # Metrics
//! - `auth_login_attempts_total` (counter): login attempts by outcome
//! - `auth_lockouts_total` (counter): locks triggered
//! - `auth_registrations_total` (counter): accounts created
//! - `auth_accounts` (gauge): accounts held by the store
//! - `http_requests_total` (counter): requests by method and status
//! - `http_request_duration_seconds` (histogram): handler latency

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_login(outcome: &'static str) {
    counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_lockout() {
    counter!("auth_lockouts_total").increment(1);
}

pub fn record_registration() {
    counter!("auth_registrations_total").increment(1);
}

pub fn record_account_count(count: usize) {
    gauge!("auth_accounts").set(count as f64);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("http_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}
