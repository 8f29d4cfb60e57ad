//! Position Sizing Calculator
//!
//! ```text
//! distance      = round(|entry - stop|, digits(point) + 1)
//! risk_amount   = balance * risk / 100
//! value_per_step = distance / tick_size * tick_value * volume_step
//! volume        = round(risk_amount / value_per_step * volume_step, 2)
//! ```
//!
//! The calculator does not clamp to the instrument minimum; callers compare
//! the result against [`InstrumentMetadata::volume_min`].

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::{SizingError, SizingRequest, SizingResult};
use crate::domain::instrument::InstrumentMetadata;

/// Lot sizes are quoted with two decimals.
const VOLUME_DECIMALS: u32 = 2;

/// Pure risk-to-volume calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer;

impl PositionSizer {
    /// Create a sizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Check that `risk` lies in `(0, 100]`.
    pub fn validate_risk(risk: Decimal) -> Result<Decimal, SizingError> {
        if risk <= Decimal::ZERO || risk > dec!(100) {
            return Err(SizingError::InvalidRisk { risk });
        }
        Ok(risk)
    }

    /// Compute the volume that risks `risk_percent` of the balance between
    /// entry and stop.
    pub fn size(
        &self,
        request: &SizingRequest,
        metadata: &InstrumentMetadata,
    ) -> Result<SizingResult, SizingError> {
        let risk = Self::validate_risk(request.risk_percent)?;

        let stop_distance = (request.entry_price - request.stop_price)
            .abs()
            .round_dp_with_strategy(
                metadata.price_digits() + 1,
                RoundingStrategy::MidpointNearestEven,
            );

        let risk_amount = request
            .account_balance
            .checked_mul(risk)
            .map(|amount| amount / dec!(100))
            .ok_or_else(|| SizingError::unavailable("risk amount overflows"))?;

        let value_per_step = stop_distance
            .checked_div(metadata.tick_size())
            .and_then(|ticks| ticks.checked_mul(metadata.tick_value()))
            .and_then(|value| value.checked_mul(metadata.volume_step()))
            .ok_or_else(|| SizingError::unavailable("value per step overflows"))?;

        if value_per_step.is_zero() {
            return Err(SizingError::unavailable(format!(
                "value per step is zero for {} (stop distance {stop_distance})",
                metadata.symbol()
            )));
        }

        let raw_volume = risk_amount
            .checked_div(value_per_step)
            .and_then(|steps| steps.checked_mul(metadata.volume_step()))
            .ok_or_else(|| SizingError::unavailable("volume overflows"))?;

        let volume = raw_volume
            .round_dp_with_strategy(VOLUME_DECIMALS, RoundingStrategy::MidpointNearestEven)
            .max(Decimal::ZERO);

        Ok(SizingResult {
            volume,
            raw_volume,
            stop_distance,
            risk_amount,
            value_per_step,
        })
    }
}
