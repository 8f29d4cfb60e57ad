//! Sizing Context
//!
//! Converts an account-risk percentage into a tradable volume using the
//! instrument's tick and volume constraints.

mod error;
mod sizer;
mod types;

pub use error::SizingError;
pub use sizer::PositionSizer;
pub use types::{SizingRequest, SizingResult};
