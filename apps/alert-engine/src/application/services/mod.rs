//! Application Services
//!
//! Shared building blocks of the lifecycle operations.

mod correlation;
mod instrument_metadata;
mod session;
mod tag_locks;

pub use correlation::CorrelationResolver;
pub use instrument_metadata::{InstrumentError, InstrumentMetadataAccessor};
pub use session::VenueSession;
pub use tag_locks::{TagGuard, TagLocks};
