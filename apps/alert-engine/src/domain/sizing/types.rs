//! Sizing inputs and outputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// Inputs to one sizing computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingRequest {
    /// Instrument.
    pub symbol: Symbol,
    /// Entry price (quote for market orders).
    pub entry_price: Decimal,
    /// Stop loss price.
    pub stop_price: Decimal,
    /// Account risk in percent.
    pub risk_percent: Decimal,
    /// Account balance (equity) in account currency.
    pub account_balance: Decimal,
}

/// Output of the sizing calculation, with intermediates kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Volume rounded to two decimals. This is what gets submitted.
    pub volume: Decimal,
    /// Volume before the final rounding.
    pub raw_volume: Decimal,
    /// Entry-to-stop distance after rounding to the price precision.
    pub stop_distance: Decimal,
    /// Money at risk.
    pub risk_amount: Decimal,
    /// Loss of one volume step over the stop distance.
    pub value_per_step: Decimal,
}
