//! Observability: structured logging, OpenTelemetry export and Prometheus
//! metrics for the alert engine.

mod metrics;
mod tracing;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_alert_outcome, record_alert_received,
    record_malformed_alert, record_submission, record_transport_reconnect, record_venue_call,
};
pub use tracing::{LogFormat, TracingConfig, TracingError, TracingGuard, init_tracing};
