//! Infrastructure Layer
//!
//! Adapters behind the application ports:
//!
//! - **Venue**: paper venue and the HTTP terminal bridge
//! - **Transport**: websocket alert listener

pub mod transport;
pub mod venue;
