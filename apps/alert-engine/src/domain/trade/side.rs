//! Trade side (long or short).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Bought, profits when price rises.
    Long,
    /// Sold, profits when price falls.
    Short,
}

impl TradeSide {
    /// Side implied by an entry placed above its stop (long); anything else
    /// is short.
    #[must_use]
    pub fn from_entry_and_stop(entry: Decimal, stop: Decimal) -> Self {
        if entry > stop {
            Self::Long
        } else {
            Self::Short
        }
    }

    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// True for [`TradeSide::Long`].
    #[must_use]
    pub const fn is_long(&self) -> bool {
        matches!(self, Self::Long)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}
