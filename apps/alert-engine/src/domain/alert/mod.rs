//! Alert Context
//!
//! Decoded alert payloads and the fixed command-to-operation table.

mod command;
mod payload;

pub use command::{AlertCommand, AlertOperation};
pub use payload::Alert;
