//! Shared Domain Types
//!
//! Identifiers and value objects used across the alert, sizing and trade
//! contexts.

mod identifiers;

pub use identifiers::{CorrelationTag, RequestId, Symbol, Ticket};
