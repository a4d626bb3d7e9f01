//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pod_monitor_heartbeats_total` (counter): heartbeats by outcome
//! - `pod_monitor_evictions_requested_total` (counter): threshold crossings
//! - `pod_monitor_eviction_results_total` (counter): results by success/failure
//! - `pod_monitor_tracked_pods` (gauge): records currently in the map
//! - `pod_monitor_records_reaped_total` (counter): deleted records reaped
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::health::types::HeartbeatOutcome;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_heartbeat(outcome: HeartbeatOutcome) {
    metrics::counter!("pod_monitor_heartbeats_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_eviction_requested() {
    metrics::counter!("pod_monitor_evictions_requested_total").increment(1);
}

pub fn record_eviction_result(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("pod_monitor_eviction_results_total", "result" => result).increment(1);
}

pub fn set_tracked_pods(count: usize) {
    metrics::gauge!("pod_monitor_tracked_pods").set(count as f64);
}

pub fn record_reaped(count: usize) {
    metrics::counter!("pod_monitor_records_reaped_total").increment(count as u64);
}
