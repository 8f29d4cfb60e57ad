//! Alert Transport
//!
//! Inbound websocket feed of alert payloads.

mod listener;
mod reconnect;

pub use listener::{AlertListener, ListenerConfig, ListenerError};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
