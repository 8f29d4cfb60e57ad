//! Engine configuration: license gate and order defaults.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::use_cases::{DispatcherSettings, OrderDefaults};

/// Engine configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// License id every alert must carry.
    #[serde(default)]
    pub license_id: String,
    /// Magic number stamped on created orders.
    #[serde(default = "default_magic")]
    pub magic: u64,
    /// Maximum slippage in points for market deals.
    #[serde(default = "default_deviation")]
    pub deviation: u32,
    /// Timeout for a single venue call.
    #[serde(default = "default_venue_timeout_ms")]
    pub venue_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            license_id: String::new(),
            magic: default_magic(),
            deviation: default_deviation(),
            venue_timeout_ms: default_venue_timeout_ms(),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("license_id", &"[REDACTED]")
            .field("magic", &self.magic)
            .field("deviation", &self.deviation)
            .field("venue_timeout_ms", &self.venue_timeout_ms)
            .finish()
    }
}

impl EngineConfig {
    /// Timeout for a single venue call.
    #[must_use]
    pub const fn venue_timeout(&self) -> Duration {
        Duration::from_millis(self.venue_timeout_ms)
    }

    /// Values stamped on every created request.
    #[must_use]
    pub const fn order_defaults(&self) -> OrderDefaults {
        OrderDefaults {
            magic: self.magic,
            deviation: self.deviation,
        }
    }

    /// Dispatcher settings derived from this section.
    #[must_use]
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            license_id: self.license_id.clone(),
            defaults: self.order_defaults(),
        }
    }
}

const fn default_magic() -> u64 {
    729_343
}

const fn default_deviation() -> u32 {
    20
}

const fn default_venue_timeout_ms() -> u64 {
    10_000
}
