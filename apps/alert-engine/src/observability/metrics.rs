//! Prometheus metrics for the alert engine.
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed with [`init_metrics`].

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for venue latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsConfig {
    /// Listen on all interfaces at `port`.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            // 1ms to 10s
            latency_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Install the Prometheus exporter and describe the engine's metrics.
///
/// Serves `/metrics` on the configured address.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    describe();

    tracing::info!(addr = %config.listen_addr, "Prometheus metrics exporter started");
    Ok(())
}

fn describe() {
    describe_counter!("alerts_received_total", "Alerts decoded from the transport");
    describe_counter!(
        "alert_outcomes_total",
        "Alert handling outcomes by command and result code"
    );
    describe_counter!(
        "alerts_malformed_total",
        "Transport frames that could not be decoded"
    );
    describe_counter!(
        "venue_submissions_total",
        "Venue submissions by action and classification"
    );
    describe_histogram!("venue_call_seconds", "Venue call latency");
    describe_counter!("transport_reconnects_total", "Alert transport reconnect attempts");
}

// ============================================================================
// Alert Metrics
// ============================================================================

/// Record a decoded alert.
pub fn record_alert_received(command: &str) {
    counter!("alerts_received_total", "command" => command.to_string()).increment(1);
}

/// Record how an alert ended.
///
/// * `outcome` - `OK`, `IGNORED`, or an error reason such as `NOT_FOUND`
pub fn record_alert_outcome(command: &str, outcome: &str) {
    counter!(
        "alert_outcomes_total",
        "command" => command.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a frame that failed to decode.
pub fn record_malformed_alert() {
    counter!("alerts_malformed_total").increment(1);
}

// ============================================================================
// Venue Metrics
// ============================================================================

/// Record a classified submission.
pub fn record_submission(action: &str, status: &str) {
    counter!(
        "venue_submissions_total",
        "action" => action.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record one venue call.
pub fn record_venue_call(operation: &str, outcome: &str, latency_seconds: f64) {
    histogram!(
        "venue_call_seconds",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .record(latency_seconds);
}

// ============================================================================
// Transport Metrics
// ============================================================================

/// Record a reconnect attempt of the alert transport.
pub fn record_transport_reconnect() {
    counter!("transport_reconnects_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_9090() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(config.listen_addr.ip().is_unspecified());
        assert!(config.latency_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn recording_without_exporter_is_noop() {
        record_alert_received("BUY");
        record_alert_outcome("BUY", "OK");
        record_submission("DEAL", "success");
        record_venue_call("submit_order", "ok", 0.01);
        record_malformed_alert();
        record_transport_reconnect();
    }
}
