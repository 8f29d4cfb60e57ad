//! Alert transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::transport::{ListenerConfig, ReconnectConfig};

/// Websocket alert feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Feed URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Reconnection behaviour.
    #[serde(default)]
    pub reconnect: ReconnectSettings,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl TransportConfig {
    /// Listener configuration.
    #[must_use]
    pub fn to_listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            url: self.url.clone(),
            reconnect: ReconnectConfig {
                initial_delay: Duration::from_millis(self.reconnect.initial_delay_ms),
                max_delay: Duration::from_millis(self.reconnect.max_delay_ms),
                multiplier: self.reconnect.multiplier,
                jitter_factor: self.reconnect.jitter_factor,
                max_attempts: self.reconnect.max_attempts,
            },
        }
    }
}

/// Reconnection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectSettings {
    /// First delay.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Delay cap.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Jitter fraction.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
    /// Attempts before giving up (0 = unlimited).
    #[serde(default)]
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter_factor: default_jitter_factor(),
            max_attempts: 0,
        }
    }
}

fn default_url() -> String {
    "ws://localhost:3000/websocket".to_string()
}

const fn default_initial_delay_ms() -> u64 {
    500
}

const fn default_max_delay_ms() -> u64 {
    30_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.1
}
