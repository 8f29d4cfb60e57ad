//! Symbol metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::Symbol;

/// Raw symbol properties as the venue lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Symbol name.
    pub name: Symbol,
    /// Whether the symbol is selected in the terminal's watch list.
    pub visible: bool,
    /// Minimum price increment.
    pub tick_size: Decimal,
    /// Money value of one tick for one lot.
    pub tick_value: Decimal,
    /// Volume increment in lots.
    pub volume_step: Decimal,
    /// Minimum tradable volume in lots.
    pub volume_min: Decimal,
    /// Price point (e.g. `0.00001` for a 5-digit FX quote).
    pub point: Decimal,
}

/// Why symbol properties cannot be used for sizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A required field is zero.
    #[error("metadata for {symbol} is incomplete: {field} is zero")]
    Incomplete {
        /// Symbol.
        symbol: Symbol,
        /// Offending field.
        field: &'static str,
    },
}

/// Validated instrument metadata.
///
/// Construction guarantees tick size, tick value and volume step are
/// non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    symbol: Symbol,
    tick_size: Decimal,
    tick_value: Decimal,
    volume_step: Decimal,
    volume_min: Decimal,
    point: Decimal,
}

impl InstrumentMetadata {
    /// Validate raw symbol properties.
    pub fn from_info(info: SymbolInfo) -> Result<Self, MetadataError> {
        for (field, value) in [
            ("tick_size", info.tick_size),
            ("tick_value", info.tick_value),
            ("volume_step", info.volume_step),
        ] {
            if value.is_zero() {
                return Err(MetadataError::Incomplete {
                    symbol: info.name,
                    field,
                });
            }
        }

        Ok(Self {
            symbol: info.name,
            tick_size: info.tick_size,
            tick_value: info.tick_value,
            volume_step: info.volume_step,
            volume_min: info.volume_min,
            point: info.point,
        })
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Minimum price increment.
    #[must_use]
    pub const fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    /// Money value of one tick for one lot.
    #[must_use]
    pub const fn tick_value(&self) -> Decimal {
        self.tick_value
    }

    /// Volume increment.
    #[must_use]
    pub const fn volume_step(&self) -> Decimal {
        self.volume_step
    }

    /// Minimum tradable volume.
    #[must_use]
    pub const fn volume_min(&self) -> Decimal {
        self.volume_min
    }

    /// Price point.
    #[must_use]
    pub const fn point(&self) -> Decimal {
        self.point
    }

    /// Decimal places of the price point.
    #[must_use]
    pub fn price_digits(&self) -> u32 {
        decimal_digits(self.point)
    }
}

/// Number of significant decimal places in `value`.
///
/// `0.01` has 2, `0.1` has 1, `1` and `10` have 0. Trailing zeros do not
/// count, so `0.010` also has 2.
#[must_use]
pub fn decimal_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}
