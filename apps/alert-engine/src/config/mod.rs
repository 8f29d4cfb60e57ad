//! Configuration module for the alert engine.
//!
//! Loads the YAML configuration file, interpolates environment variables and
//! validates the result before any component is built.
//!
//! # Usage
//!
//! ```rust,ignore
//! use alert_engine::config::load_config;
//!
//! // Path from ALERT_ENGINE_CONFIG, falling back to config.yaml
//! let config = load_config(None)?;
//!
//! println!("venue: {}", config.venue.kind);
//! ```

mod engine;
mod observability;
mod transport;
mod venue;

use serde::Deserialize;
use thiserror::Error;

pub use engine::EngineConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig, OtlpConfig};
pub use transport::{ReconnectSettings, TransportConfig};
pub use venue::{BridgeSettings, PaperSettings, RetrySettings, VenueConfig, VenueKind};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ALERT_ENGINE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Venue configuration.
    #[serde(default)]
    pub venue: VenueConfig,
    /// Alert transport configuration.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to the value of
///   `ALERT_ENGINE_CONFIG`, then "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become the empty string.
#[allow(clippy::expect_used)] // Regex is a constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.engine.license_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.license_id must be set".to_string(),
        ));
    }

    if config.engine.venue_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "engine.venue_timeout_ms must be positive".to_string(),
        ));
    }

    if config.transport.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "transport.url must be set".to_string(),
        ));
    }

    let reconnect = &config.transport.reconnect;
    if reconnect.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "transport.reconnect.multiplier must be at least 1.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&reconnect.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "transport.reconnect.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    match config.venue.kind {
        VenueKind::Bridge => validate_bridge(&config.venue.bridge),
        VenueKind::Paper => validate_paper(&config.venue.paper),
    }
}

fn validate_bridge(bridge: &BridgeSettings) -> Result<(), ConfigError> {
    if bridge.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "venue.bridge.base_url is required when venue.kind is bridge".to_string(),
        ));
    }
    if bridge.login == 0 {
        return Err(ConfigError::ValidationError(
            "venue.bridge.login is required when venue.kind is bridge".to_string(),
        ));
    }
    if bridge.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "venue.bridge.retry.max_attempts must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_paper(paper: &PaperSettings) -> Result<(), ConfigError> {
    if paper.equity.is_sign_negative() {
        return Err(ConfigError::ValidationError(
            "venue.paper.equity must not be negative".to_string(),
        ));
    }

    for symbol in &paper.symbols {
        let name = symbol.name.as_str();
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "venue.paper.symbols entries need a name".to_string(),
            ));
        }
        let sizes = [
            symbol.tick_size,
            symbol.tick_value,
            symbol.volume_step,
            symbol.volume_min,
            symbol.point,
        ];
        if sizes.iter().any(|v| !v.is_sign_positive() || v.is_zero()) {
            return Err(ConfigError::ValidationError(format!(
                "venue.paper.symbols.{name}: tick and volume sizes must be positive"
            )));
        }
        if symbol.bid > symbol.ask {
            return Err(ConfigError::ValidationError(format!(
                "venue.paper.symbols.{name}: bid must not exceed ask"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use std::time::Duration;

    const MINIMAL: &str = r"
engine:
  license_id: lic-1
";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_string(MINIMAL).unwrap();

        assert_eq!(config.engine.license_id, "lic-1");
        assert_eq!(config.engine.magic, 729_343);
        assert_eq!(config.engine.deviation, 20);
        assert_eq!(config.engine.venue_timeout(), Duration::from_secs(10));
        assert_eq!(config.venue.kind, VenueKind::Paper);
        assert_eq!(config.venue.paper.equity, dec!(100000));
        assert_eq!(config.transport.url, "ws://localhost:3000/websocket");
        assert_eq!(config.observability.metrics.port, 9090);
        assert!(!config.observability.otlp.enabled);
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r"
engine:
  license_id: lic-2
  magic: 42
  deviation: 5
  venue_timeout_ms: 2500
venue:
  kind: bridge
  bridge:
    base_url: http://127.0.0.1:8228/
    login: 5551234
    password: hunter2
    server: Demo-Server
    timeout_ms: 4000
    retry:
      max_attempts: 5
transport:
  url: ws://feed.local/alerts
  reconnect:
    initial_delay_ms: 250
    max_attempts: 10
observability:
  logging:
    level: debug
    format: json
  otlp:
    enabled: true
    endpoint: http://collector:4317
  metrics:
    port: 0
";
        let config = load_config_from_string(yaml).unwrap();

        assert_eq!(config.engine.order_defaults().magic, 42);
        assert_eq!(config.engine.dispatcher_settings().defaults.deviation, 5);

        let bridge = config.venue.bridge.to_bridge_config();
        assert_eq!(bridge.base_url, "http://127.0.0.1:8228");
        assert_eq!(bridge.login, 5_551_234);
        assert_eq!(bridge.timeout, Duration::from_secs(4));
        assert_eq!(bridge.retry.max_attempts, 5);

        let listener = config.transport.to_listener_config();
        assert_eq!(listener.url, "ws://feed.local/alerts");
        assert_eq!(listener.reconnect.initial_delay, Duration::from_millis(250));
        assert_eq!(listener.reconnect.max_attempts, 10);

        let tracing = config.observability.to_tracing_config();
        assert_eq!(tracing.filter, "alert_engine=debug");
        assert_eq!(
            tracing.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
        assert!(config.observability.to_metrics_config().is_none());
    }

    #[test]
    fn test_paper_symbols_parse() {
        let yaml = r"
engine:
  license_id: lic-1
venue:
  kind: paper
  paper:
    equity: 2500
    symbols:
      - name: EURUSD
        bid: 1.10000
        ask: 1.10010
      - name: US30
        tick_size: 1
        tick_value: 1
        volume_step: 0.1
        volume_min: 0.1
        point: 1
        bid: 39000
        ask: 39002
";
        let config = load_config_from_string(yaml).unwrap();

        let symbols = &config.venue.paper.symbols;
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].tick_size, dec!(0.00001));
        assert_eq!(symbols[1].volume_step, dec!(0.1));
        assert_eq!(config.venue.paper.equity, dec!(2500));
    }

    #[test]
    fn test_example_config_parses() {
        let yaml = include_str!("../../config.example.yaml").replace("${LICENSE_ID}", "example");
        let config = load_config_from_string(&yaml).unwrap();

        assert_eq!(config.engine.license_id, "example");
        assert_eq!(config.venue.paper.symbols.len(), 3);
        assert_eq!(config.transport.reconnect.max_attempts, 0);
    }

    #[test]
    fn test_missing_license_is_rejected() {
        let result = load_config_from_string("engine:\n  magic: 1\n");

        let Err(err) = result else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("license_id"));
    }

    #[test]
    fn test_bridge_requires_url_and_login() {
        let yaml = r"
engine:
  license_id: lic-1
venue:
  kind: bridge
  bridge:
    login: 7
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("base_url"));

        let yaml = r"
engine:
  license_id: lic-1
venue:
  kind: bridge
  bridge:
    base_url: http://localhost:8228
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("login"));
    }

    #[test]
    fn test_paper_symbol_with_crossed_quote_is_rejected() {
        let yaml = r"
engine:
  license_id: lic-1
venue:
  paper:
    symbols:
      - name: EURUSD
        bid: 1.2
        ask: 1.1
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("bid must not exceed ask"));
    }

    #[test]
    fn test_paper_symbol_with_zero_tick_is_rejected() {
        let yaml = r"
engine:
  license_id: lic-1
venue:
  paper:
    symbols:
      - name: EURUSD
        tick_size: 0
        bid: 1.1
        ask: 1.1
";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_venue_timeout_is_rejected() {
        let yaml = "engine:\n  license_id: lic-1\n  venue_timeout_ms: 0\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_venue_kind_is_a_parse_error() {
        let yaml = "engine:\n  license_id: lic-1\nvenue:\n  kind: fix\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let yaml = "engine:\n  license_id: ${ALERT_ENGINE_TEST_UNLIKELY_LICENSE_VAR:-fallback}\n";
        let config = load_config_from_string(yaml).unwrap();
        assert_eq!(config.engine.license_id, "fallback");
    }

    #[test]
    fn test_env_var_without_default_is_empty() {
        let out = interpolate_env_vars("a=${ALERT_ENGINE_TEST_UNLIKELY_EMPTY_VAR}.");
        assert_eq!(out, "a=.");
    }

    #[test]
    fn test_env_var_from_process_environment() {
        // PATH is set in every test environment
        let path = std::env::var("PATH").unwrap();
        let out = interpolate_env_vars("${PATH:-unused}");
        assert_eq!(out, path);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let path = file.path().to_str().unwrap();
        let config = load_config(Some(path)).unwrap();

        assert_eq!(config.engine.license_id, "lic-1");
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = load_config(Some("/nonexistent/alert-engine/config.yaml"));

        let Err(ConfigError::ReadError { path, .. }) = result else {
            panic!("expected read error");
        };
        assert_eq!(path, "/nonexistent/alert-engine/config.yaml");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let yaml = r"
engine:
  license_id: secret-license
venue:
  bridge:
    password: secret-password
";
        let config = load_config_from_string(yaml).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("secret-license"));
        assert!(!debug.contains("secret-password"));
    }
}
