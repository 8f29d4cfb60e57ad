//! Outgoing venue instructions.
//!
//! An [`OrderRequest`] is built fresh for every submission and never kept.
//! The constructors below cover the request shapes the engine sends.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OpenPosition, TradeRecord, TradeSide};
use crate::domain::shared::{Symbol, Ticket};

/// Kind of action a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Immediate market deal (entry or close).
    Deal,
    /// Place a pending order.
    Pending,
    /// Modify a pending order's price, stop and target.
    Modify,
    /// Modify an open position's stop and target.
    SlTp,
    /// Remove a pending order.
    Remove,
}

impl TradeAction {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deal => "DEAL",
            Self::Pending => "PENDING",
            Self::Modify => "MODIFY",
            Self::SlTp => "SLTP",
            Self::Remove => "REMOVE",
        }
    }
}

/// Order type carried by deal and pending requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market buy.
    Buy,
    /// Market sell.
    Sell,
    /// Buy limit.
    BuyLimit,
    /// Sell limit.
    SellLimit,
}

impl OrderType {
    /// Market order type for `side`.
    #[must_use]
    pub const fn market(side: TradeSide) -> Self {
        match side {
            TradeSide::Long => Self::Buy,
            TradeSide::Short => Self::Sell,
        }
    }

    /// Limit order type for `side`.
    #[must_use]
    pub const fn limit(side: TradeSide) -> Self {
        match side {
            TradeSide::Long => Self::BuyLimit,
            TradeSide::Short => Self::SellLimit,
        }
    }

    /// Side this order type trades.
    #[must_use]
    pub const fn side(&self) -> TradeSide {
        match self {
            Self::Buy | Self::BuyLimit => TradeSide::Long,
            Self::Sell | Self::SellLimit => TradeSide::Short,
        }
    }
}

/// Order expiration policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimePolicy {
    /// Good till cancelled.
    #[default]
    Gtc,
}

/// Order filling policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FillPolicy {
    /// Immediate or cancel.
    #[default]
    Ioc,
}

/// A single instruction to the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Action kind.
    pub action: TradeAction,
    /// Symbol.
    pub symbol: Option<Symbol>,
    /// Volume in lots.
    pub volume: Option<Decimal>,
    /// Order type for deals and pending placements.
    pub order_type: Option<OrderType>,
    /// Price (entry, modify price, or close price).
    pub price: Option<Decimal>,
    /// Stop loss.
    pub sl: Option<Decimal>,
    /// Take profit.
    pub tp: Option<Decimal>,
    /// Maximum slippage in points.
    pub deviation: Option<u32>,
    /// Magic number.
    pub magic: u64,
    /// Comment (the correlation tag, or a fixed label).
    pub comment: String,
    /// Position ticket for closes and position modifications.
    pub position: Option<Ticket>,
    /// Order ticket for pending modifications and removals.
    pub order: Option<Ticket>,
    /// Expiration policy.
    pub type_time: Option<TimePolicy>,
    /// Filling policy.
    pub type_filling: Option<FillPolicy>,
}

/// Parameters shared by entry requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryParams {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Direction.
    pub side: TradeSide,
    /// Volume in lots.
    pub volume: Decimal,
    /// Entry price (quote for market deals).
    pub price: Decimal,
    /// Stop loss.
    pub sl: Option<Decimal>,
    /// Take profit.
    pub tp: Option<Decimal>,
    /// Comment.
    pub comment: String,
}

impl OrderRequest {
    fn blank(action: TradeAction, magic: u64, comment: String) -> Self {
        Self {
            action,
            symbol: None,
            volume: None,
            order_type: None,
            price: None,
            sl: None,
            tp: None,
            deviation: None,
            magic,
            comment,
            position: None,
            order: None,
            type_time: None,
            type_filling: None,
        }
    }

    /// Market entry deal.
    #[must_use]
    pub fn market(entry: EntryParams, magic: u64, deviation: u32) -> Self {
        Self {
            symbol: Some(entry.symbol),
            volume: Some(entry.volume),
            order_type: Some(OrderType::market(entry.side)),
            price: Some(entry.price),
            sl: entry.sl,
            tp: entry.tp,
            deviation: Some(deviation),
            type_time: Some(TimePolicy::Gtc),
            type_filling: Some(FillPolicy::Ioc),
            ..Self::blank(TradeAction::Deal, magic, entry.comment)
        }
    }

    /// Pending limit order placement.
    #[must_use]
    pub fn pending(entry: EntryParams, magic: u64, deviation: u32) -> Self {
        Self {
            symbol: Some(entry.symbol),
            volume: Some(entry.volume),
            order_type: Some(OrderType::limit(entry.side)),
            price: Some(entry.price),
            sl: entry.sl,
            tp: entry.tp,
            deviation: Some(deviation),
            type_time: Some(TimePolicy::Gtc),
            type_filling: Some(FillPolicy::Ioc),
            ..Self::blank(TradeAction::Pending, magic, entry.comment)
        }
    }

    /// Removal of a pending order.
    #[must_use]
    pub fn remove(order: &TradeRecord, comment: impl Into<String>) -> Self {
        Self {
            symbol: Some(order.symbol.clone()),
            order: Some(order.ticket),
            ..Self::blank(TradeAction::Remove, order.magic, comment.into())
        }
    }

    /// Price/stop/target modification of a pending order.
    ///
    /// The modify action needs the entry price even when it is unchanged.
    #[must_use]
    pub fn modify_pending(order: &TradeRecord, sl: Option<Decimal>, tp: Option<Decimal>) -> Self {
        Self {
            symbol: Some(order.symbol.clone()),
            order: Some(order.ticket),
            price: Some(order.entry_price),
            sl,
            tp,
            ..Self::blank(TradeAction::Modify, order.magic, order.comment.clone())
        }
    }

    /// Stop/target modification of an open position.
    #[must_use]
    pub fn modify_position(
        position: &TradeRecord,
        sl: Option<Decimal>,
        tp: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: Some(position.symbol.clone()),
            position: Some(position.ticket),
            sl,
            tp,
            ..Self::blank(TradeAction::SlTp, position.magic, position.comment.clone())
        }
    }

    /// Opposite-side market deal closing `volume` of `position` at `price`,
    /// stamped with the position's magic.
    #[must_use]
    pub fn close(
        position: &OpenPosition,
        volume: Decimal,
        price: Decimal,
        deviation: u32,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            symbol: Some(position.symbol.clone()),
            volume: Some(volume),
            order_type: Some(OrderType::market(position.side.opposite())),
            price: Some(price),
            deviation: Some(deviation),
            position: Some(position.ticket),
            type_time: Some(TimePolicy::Gtc),
            type_filling: Some(FillPolicy::Ioc),
            ..Self::blank(TradeAction::Deal, position.magic, comment.into())
        }
    }
}
