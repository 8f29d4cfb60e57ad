//! Venue Adapters
//!
//! Implementations of `VenuePort`.

pub mod bridge;
mod paper;

pub use bridge::{BridgeConfig, BridgeError, BridgeVenueAdapter};
pub use paper::{PaperSymbol, PaperVenue};
