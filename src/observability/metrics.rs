//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_connections_accepted_total` (counter)
//! - `balancer_active_relays` (gauge)
//! - `balancer_messages_relayed_total` (counter, by backend)
//! - `balancer_relay_failures_total` (counter, by stage)
//! - `balancer_queue_depth` (gauge, sampled on admission)
//! - `balancer_admission_rejected_total` (counter)
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::net::relay::RelayStage;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_accepted() {
    counter!("balancer_connections_accepted_total").increment(1);
}

pub fn relay_started() {
    gauge!("balancer_active_relays").increment(1.0);
}

pub fn relay_finished() {
    gauge!("balancer_active_relays").decrement(1.0);
}

pub fn record_message(backend: &str) {
    counter!("balancer_messages_relayed_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_relay_failure(stage: RelayStage) {
    counter!("balancer_relay_failures_total", "stage" => stage.as_str()).increment(1);
}

pub fn set_queue_depth(depth: usize) {
    gauge!("balancer_queue_depth").set(depth as f64);
}

pub fn record_admission_rejected() {
    counter!("balancer_admission_rejected_total").increment(1);
}
