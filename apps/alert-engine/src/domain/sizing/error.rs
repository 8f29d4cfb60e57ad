//! Sizing errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Why a position size could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    /// Risk percentage outside `(0, 100]`.
    #[error("risk {risk}% is outside (0, 100]")]
    InvalidRisk {
        /// Offending value.
        risk: Decimal,
    },

    /// Risk-based sizing was requested without a stop loss.
    #[error("risk-based sizing requires a stop loss")]
    MissingStopLoss,

    /// Metadata missing or degenerate, or the stop distance rounds to zero.
    #[error("sizing unavailable: {reason}")]
    SizingUnavailable {
        /// Human-readable reason.
        reason: String,
    },
}

impl SizingError {
    /// Shorthand for [`SizingError::SizingUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SizingUnavailable {
            reason: reason.into(),
        }
    }
}
