//! Venue configuration: which adapter to run and how to reach it.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::infrastructure::venue::PaperSymbol;
use crate::infrastructure::venue::bridge::{BridgeConfig, RetryConfig};

/// Venue adapter selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    /// In-process simulated terminal.
    #[default]
    Paper,
    /// HTTP terminal bridge.
    Bridge,
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paper => write!(f, "paper"),
            Self::Bridge => write!(f, "bridge"),
        }
    }
}

/// Venue configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueConfig {
    /// Adapter to run.
    #[serde(default)]
    pub kind: VenueKind,
    /// Bridge settings, used when `kind` is `bridge`.
    #[serde(default)]
    pub bridge: BridgeSettings,
    /// Paper settings, used when `kind` is `paper`.
    #[serde(default)]
    pub paper: PaperSettings,
}

/// Terminal bridge settings.
#[derive(Clone, Deserialize)]
pub struct BridgeSettings {
    /// Bridge base URL.
    #[serde(default)]
    pub base_url: String,
    /// Terminal account login.
    #[serde(default)]
    pub login: u64,
    /// Terminal account password.
    #[serde(default)]
    pub password: String,
    /// Trade server name.
    #[serde(default)]
    pub server: String,
    /// HTTP request timeout.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry policy for read-only calls.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            login: 0,
            password: String::new(),
            server: String::new(),
            timeout_ms: default_http_timeout_ms(),
            retry: RetrySettings::default(),
        }
    }
}

impl fmt::Debug for BridgeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSettings")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("server", &self.server)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry", &self.retry)
            .finish()
    }
}

impl BridgeSettings {
    /// Adapter configuration.
    #[must_use]
    pub fn to_bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new(
            self.base_url.as_str(),
            self.login,
            self.password.as_str(),
            self.server.as_str(),
        )
        .with_timeout(Duration::from_millis(self.timeout_ms))
        .with_retry(self.retry.to_retry_config())
    }
}

/// Retry settings for read-only bridge calls.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetrySettings {
    /// Adapter retry policy.
    #[must_use]
    pub const fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

/// Paper venue settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperSettings {
    /// Starting account equity.
    #[serde(default = "default_equity")]
    pub equity: Decimal,
    /// Listed symbols.
    #[serde(default)]
    pub symbols: Vec<PaperSymbol>,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            equity: default_equity(),
            symbols: Vec::new(),
        }
    }
}

const fn default_http_timeout_ms() -> u64 {
    30_000
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    5_000
}

const fn default_multiplier() -> f64 {
    2.0
}

fn default_equity() -> Decimal {
    dec!(100000)
}
