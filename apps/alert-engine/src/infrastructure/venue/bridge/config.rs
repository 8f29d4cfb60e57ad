//! Bridge adapter configuration.

use std::fmt;
use std::time::Duration;

/// Configuration for the terminal bridge adapter.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Base URL of the bridge service, without trailing slash.
    pub base_url: String,
    /// Terminal account login.
    pub login: u64,
    /// Terminal account password.
    pub password: String,
    /// Trade server name.
    pub server: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for read-only calls.
    pub retry: RetryConfig,
}

impl BridgeConfig {
    /// Create a new configuration with default timeout and retry policy.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        login: u64,
        password: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            login,
            password: password.into(),
            server: server.into(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("server", &self.server)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Retry configuration for read-only bridge calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, first one included.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}
