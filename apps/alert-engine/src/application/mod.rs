//! Application Layer
//!
//! Orchestrates the domain against the venue:
//!
//! - **Ports**: the venue interface
//! - **Services**: venue session, metadata accessor, correlation resolver, tag locks
//! - **Use Cases**: the lifecycle operations and the alert dispatcher
//! - **DTOs**: operation reports returned to the transport

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
