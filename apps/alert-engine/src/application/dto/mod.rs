//! Data Transfer Objects
//!
//! What a handled alert reports back to the transport.

mod report;

pub use report::{OperationReport, Submission, TicketOutcome};
