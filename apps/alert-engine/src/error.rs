//! Engine error taxonomy.
//!
//! Every failure of an alert is one of these. None of them is fatal to the
//! process: the dispatcher reports it and waits for the next alert.
//!
//! | Category | Venue called? | Example |
//! |----------|---------------|---------|
//! | Validation | no | wrong license, missing symbol |
//! | Sizing | no (metadata only) | risk out of range |
//! | Not found | listing only | tag has no matching record |
//! | Venue rejected | yes | invalid stops, no money |
//! | Venue unknown | yes | timeout, no response |
//! | Venue unavailable | queries only | metadata or quote lookup failed |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::CorrelationTag;
use crate::domain::sizing::SizingError;
use crate::domain::trade::RetCode;

/// Stable error codes used in logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    /// License id mismatch.
    Unauthorized,
    /// Command missing or not recognised.
    InvalidCommand,
    /// Symbol missing.
    InvalidSymbol,
    /// Neither side nor entry/stop given.
    MissingDirection,
    /// Limit order without entry price.
    MissingEntryPrice,
    /// Neither risk nor quantity.
    MissingVolume,
    /// Update with neither stop nor target.
    NothingToUpdate,
    /// Close percentage outside `(0, 100]`.
    InvalidPercent,
    /// Volume below the instrument minimum.
    BelowMinimumVolume,

    // Sizing
    /// Risk outside `(0, 100]`.
    InvalidRisk,
    /// Risk sizing without stop loss.
    MissingStopLoss,
    /// Metadata unusable or stop distance zero.
    SizingUnavailable,

    // Correlation
    /// No record carries the tag.
    NotFound,

    // Venue
    /// Venue refused the request.
    VenueRejected,
    /// Outcome of a submission is unknown.
    VenueUnknown,
    /// A read-only venue query failed.
    VenueUnavailable,
}

impl ErrorCode {
    /// Reason string (SCREAMING_SNAKE_CASE).
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::InvalidSymbol => "INVALID_SYMBOL",
            Self::MissingDirection => "MISSING_DIRECTION",
            Self::MissingEntryPrice => "MISSING_ENTRY_PRICE",
            Self::MissingVolume => "MISSING_VOLUME",
            Self::NothingToUpdate => "NOTHING_TO_UPDATE",
            Self::InvalidPercent => "INVALID_PERCENT",
            Self::BelowMinimumVolume => "BELOW_MINIMUM_VOLUME",
            Self::InvalidRisk => "INVALID_RISK",
            Self::MissingStopLoss => "MISSING_STOP_LOSS",
            Self::SizingUnavailable => "SIZING_UNAVAILABLE",
            Self::NotFound => "NOT_FOUND",
            Self::VenueRejected => "VENUE_REJECTED",
            Self::VenueUnknown => "VENUE_UNKNOWN",
            Self::VenueUnavailable => "VENUE_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Malformed, unauthorized or incomplete alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// License id does not match the configured one.
    #[error("license id does not match")]
    Unauthorized,

    /// Command missing or not one of the known values.
    #[error("command is missing or invalid")]
    InvalidCommand,

    /// Symbol missing.
    #[error("symbol is missing")]
    InvalidSymbol,

    /// Side can be neither read nor derived.
    #[error("direction requires an explicit side or both entry price and stop loss")]
    MissingDirection,

    /// Limit order without entry price.
    #[error("limit order requires an entry price")]
    MissingEntryPrice,

    /// No risk and no quantity.
    #[error("order requires a risk percentage with a stop loss or an explicit volume")]
    MissingVolume,

    /// Stop/target update with neither value.
    #[error("update requires a stop loss or a take profit")]
    NothingToUpdate,

    /// Close percentage outside `(0, 100]`.
    #[error("percent {percent} is outside (0, 100]")]
    InvalidPercent {
        /// Offending value.
        percent: Decimal,
    },

    /// Volume below the instrument minimum.
    #[error("volume {volume} is below the minimum {minimum}")]
    BelowMinimumVolume {
        /// Computed volume.
        volume: Decimal,
        /// Instrument minimum.
        minimum: Decimal,
    },
}

/// Error returned by alert handling and every lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Alert rejected before any venue call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Volume could not be sized.
    #[error("sizing failed: {0}")]
    Sizing(#[from] SizingError),

    /// No record matches the tag.
    #[error("no matching order or position for tag '{tag}'")]
    NotFound {
        /// Tag searched for.
        tag: CorrelationTag,
    },

    /// Venue refused the submission.
    #[error("venue rejected request [{retcode}]: {message}")]
    VenueRejected {
        /// Terminal return code.
        retcode: RetCode,
        /// Terminal comment.
        message: String,
    },

    /// Submission outcome unknown; reconcile before retrying.
    #[error("venue outcome unknown: {reason}")]
    VenueUnknown {
        /// What went wrong.
        reason: String,
    },

    /// A read-only venue query failed.
    #[error("venue unavailable: {message}")]
    VenueUnavailable {
        /// What went wrong.
        message: String,
    },
}

impl EngineError {
    /// Stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => match err {
                ValidationError::Unauthorized => ErrorCode::Unauthorized,
                ValidationError::InvalidCommand => ErrorCode::InvalidCommand,
                ValidationError::InvalidSymbol => ErrorCode::InvalidSymbol,
                ValidationError::MissingDirection => ErrorCode::MissingDirection,
                ValidationError::MissingEntryPrice => ErrorCode::MissingEntryPrice,
                ValidationError::MissingVolume => ErrorCode::MissingVolume,
                ValidationError::NothingToUpdate => ErrorCode::NothingToUpdate,
                ValidationError::InvalidPercent { .. } => ErrorCode::InvalidPercent,
                ValidationError::BelowMinimumVolume { .. } => ErrorCode::BelowMinimumVolume,
            },
            Self::Sizing(err) => match err {
                SizingError::InvalidRisk { .. } => ErrorCode::InvalidRisk,
                SizingError::MissingStopLoss => ErrorCode::MissingStopLoss,
                SizingError::SizingUnavailable { .. } => ErrorCode::SizingUnavailable,
            },
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::VenueRejected { .. } => ErrorCode::VenueRejected,
            Self::VenueUnknown { .. } => ErrorCode::VenueUnknown,
            Self::VenueUnavailable { .. } => ErrorCode::VenueUnavailable,
        }
    }

    /// True when the failure happened before any submission reached the venue.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Sizing(_) | Self::NotFound { .. }
        )
    }

    /// Not-found error for `tag`.
    #[must_use]
    pub fn not_found(tag: CorrelationTag) -> Self {
        Self::NotFound { tag }
    }
}
