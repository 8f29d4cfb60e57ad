//! Pending orders, open positions and the record type that unifies them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TradeSide;
use crate::domain::shared::{CorrelationTag, Symbol, Ticket};

/// Type of a resting (unfilled) order on the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingOrderType {
    /// Buy below the market.
    BuyLimit,
    /// Sell above the market.
    SellLimit,
    /// Buy above the market.
    BuyStop,
    /// Sell below the market.
    SellStop,
    /// Buy stop that becomes a limit order.
    BuyStopLimit,
    /// Sell stop that becomes a limit order.
    SellStopLimit,
}

impl PendingOrderType {
    /// Limit orders are the only pending type this engine places or bulk-cancels.
    #[must_use]
    pub const fn is_limit(&self) -> bool {
        matches!(self, Self::BuyLimit | Self::SellLimit)
    }

    /// Side the order opens when filled.
    #[must_use]
    pub const fn side(&self) -> TradeSide {
        match self {
            Self::BuyLimit | Self::BuyStop | Self::BuyStopLimit => TradeSide::Long,
            Self::SellLimit | Self::SellStop | Self::SellStopLimit => TradeSide::Short,
        }
    }
}

/// A pending order as listed by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Order ticket.
    pub ticket: Ticket,
    /// Symbol.
    pub symbol: Symbol,
    /// Pending order type.
    pub order_type: PendingOrderType,
    /// Requested volume in lots.
    pub volume: Decimal,
    /// Entry price of the order.
    pub price_open: Decimal,
    /// Stop loss, if set.
    #[serde(default)]
    pub sl: Option<Decimal>,
    /// Take profit, if set.
    #[serde(default)]
    pub tp: Option<Decimal>,
    /// Magic number stamped at creation.
    pub magic: u64,
    /// Order comment (the correlation tag).
    #[serde(default)]
    pub comment: String,
}

/// An open position as listed by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// Position ticket.
    pub ticket: Ticket,
    /// Symbol.
    pub symbol: Symbol,
    /// Position side.
    pub side: TradeSide,
    /// Held volume in lots.
    pub volume: Decimal,
    /// Average entry price.
    pub price_open: Decimal,
    /// Stop loss, if set.
    #[serde(default)]
    pub sl: Option<Decimal>,
    /// Take profit, if set.
    #[serde(default)]
    pub tp: Option<Decimal>,
    /// Magic number stamped at creation.
    pub magic: u64,
    /// Position comment (the correlation tag).
    #[serde(default)]
    pub comment: String,
}

/// Whether a record is still resting or already filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    /// Unfilled pending order.
    Pending,
    /// Filled, currently held position.
    Open,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Open => write!(f, "OPEN"),
        }
    }
}

/// A pending order or an open position, seen through one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Venue ticket.
    pub ticket: Ticket,
    /// Symbol.
    pub symbol: Symbol,
    /// Pending or open.
    pub kind: RecordKind,
    /// Long or short.
    pub side: TradeSide,
    /// Volume in lots.
    pub volume: Decimal,
    /// Entry price (order price or position open price).
    pub entry_price: Decimal,
    /// Stop loss, if set.
    pub stop_price: Option<Decimal>,
    /// Take profit, if set.
    pub target_price: Option<Decimal>,
    /// Comment carrying the correlation tag.
    pub comment: String,
    /// Magic number.
    pub magic: u64,
    /// Pending order type; `None` for open positions.
    pub pending_type: Option<PendingOrderType>,
}

impl TradeRecord {
    /// Whether this record carries `tag` as its comment.
    #[must_use]
    pub fn has_tag(&self, tag: &CorrelationTag) -> bool {
        self.comment == tag.as_str()
    }

    /// True for pending orders.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.kind, RecordKind::Pending)
    }

    /// True for pending orders of a limit type.
    #[must_use]
    pub fn is_pending_limit(&self) -> bool {
        self.pending_type.is_some_and(|t| t.is_limit())
    }
}

impl From<PendingOrder> for TradeRecord {
    fn from(order: PendingOrder) -> Self {
        Self {
            ticket: order.ticket,
            symbol: order.symbol,
            kind: RecordKind::Pending,
            side: order.order_type.side(),
            volume: order.volume,
            entry_price: order.price_open,
            stop_price: order.sl,
            target_price: order.tp,
            comment: order.comment,
            magic: order.magic,
            pending_type: Some(order.order_type),
        }
    }
}

impl From<OpenPosition> for TradeRecord {
    fn from(position: OpenPosition) -> Self {
        Self {
            ticket: position.ticket,
            symbol: position.symbol,
            kind: RecordKind::Open,
            side: position.side,
            volume: position.volume,
            entry_price: position.price_open,
            stop_price: position.sl,
            target_price: position.tp,
            comment: position.comment,
            magic: position.magic,
            pending_type: None,
        }
    }
}
