//! Terminal Bridge Adapter
//!
//! `VenuePort` over HTTP against a bridge process that owns the terminal
//! connection:
//! - Session login/logout with a bearer token
//! - Retry with exponential backoff for read-only calls
//! - Trade requests sent exactly once

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::BridgeVenueAdapter;
pub use config::{BridgeConfig, RetryConfig};
pub use error::BridgeError;
