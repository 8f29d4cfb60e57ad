//! Application Ports
//!
//! Driven (outbound) interfaces the engine uses to reach external systems.

mod venue_port;

pub use venue_port::{Quote, VenueError, VenuePort};
