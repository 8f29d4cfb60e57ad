//! Observability configuration for logging, tracing export and metrics.

use serde::{Deserialize, Serialize};

use crate::observability::{LogFormat, MetricsConfig, TracingConfig};

/// Observability configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// OTLP trace export.
    #[serde(default)]
    pub otlp: OtlpConfig,
    /// Prometheus exporter.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for this crate when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// OTLP export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtlpConfig {
    /// Export spans.
    #[serde(default)]
    pub enabled: bool,
    /// Collector gRPC endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub endpoint: String,
    /// Reported service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otlp_endpoint(),
            service_name: default_service_name(),
        }
    }
}

/// Metrics exporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus scrape port; 0 disables the exporter.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl ObservabilityConfig {
    /// Subscriber configuration.
    #[must_use]
    pub fn to_tracing_config(&self) -> TracingConfig {
        TracingConfig {
            filter: format!("alert_engine={}", self.logging.level),
            format: self.logging.format,
            otlp_endpoint: self.otlp.enabled.then(|| self.otlp.endpoint.clone()),
            service_name: self.otlp.service_name.clone(),
        }
    }

    /// Exporter configuration, or `None` when metrics are off.
    #[must_use]
    pub fn to_metrics_config(&self) -> Option<MetricsConfig> {
        (self.metrics.port != 0).then(|| MetricsConfig::with_port(self.metrics.port))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "alert-engine".to_string()
}

const fn default_metrics_port() -> u16 {
    9090
}
