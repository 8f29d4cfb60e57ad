//! Domain Layer
//!
//! Business types and rules with no I/O. Everything here is deterministic
//! and testable without a venue.
//!
//! # Bounded Contexts
//!
//! - [`alert`]: inbound alert payloads and the command table
//! - [`instrument`]: symbol metadata as reported by the venue
//! - [`sizing`]: risk-based position sizing
//! - [`trade`]: trade records, order requests and submission results

pub mod alert;
pub mod instrument;
pub mod shared;
pub mod sizing;
pub mod trade;
