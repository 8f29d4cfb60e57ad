//! Alert payload as it arrives from the transport.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{CorrelationTag, Symbol};

/// A decoded alert message.
///
/// Every field is optional on the wire; the dispatcher decides which ones
/// are required. Decimal fields accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// License tag compared against the configured license id.
    #[serde(default)]
    pub license_id: Option<String>,
    /// Raw command; kept as text so unknown values can be told apart from
    /// missing ones.
    #[serde(default)]
    pub command: Option<String>,
    /// Venue symbol.
    #[serde(default)]
    pub symbol: Option<Symbol>,
    /// Entry price.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Stop loss.
    #[serde(default)]
    pub sl: Option<Decimal>,
    /// Take profit.
    #[serde(default)]
    pub tp: Option<Decimal>,
    /// Account risk in percent, `(0, 100]`.
    #[serde(default)]
    pub risk: Option<Decimal>,
    /// Explicit volume in lots, used when no risk is given.
    #[serde(default, alias = "qty")]
    pub volume: Option<Decimal>,
    /// Share of a position to close in percent, `(0, 100]`.
    #[serde(default, alias = "percent")]
    pub perc: Option<Decimal>,
    /// Correlation tag.
    #[serde(default)]
    pub comment: Option<String>,
}

impl Alert {
    /// Correlation tag, if the alert carries a non-empty comment.
    #[must_use]
    pub fn tag(&self) -> Option<CorrelationTag> {
        self.comment
            .as_deref()
            .filter(|comment| !comment.is_empty())
            .map(CorrelationTag::from)
    }
}
