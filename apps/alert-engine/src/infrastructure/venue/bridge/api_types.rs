//! Bridge API request and response types.
//!
//! These mirror the terminal's native structures: numeric action and order
//! type codes, `0` meaning "no stop" or "no ticket".

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BridgeError;
use crate::application::ports::Quote;
use crate::domain::instrument::SymbolInfo;
use crate::domain::shared::{Symbol, Ticket};
use crate::domain::trade::{
    FillPolicy, OpenPosition, OrderRequest, OrderType, PendingOrder, PendingOrderType, RetCode,
    SubmitResult, TimePolicy, TradeAction, TradeSide,
};

// ============================================================================
// Session
// ============================================================================

/// Terminal login request.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Account number.
    pub login: u64,
    /// Account password.
    pub password: String,
    /// Trade server.
    pub server: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("server", &self.server)
            .finish()
    }
}

/// Terminal login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Session token sent with every later request.
    pub token: String,
}

/// Error body returned by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeErrorResponse {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

// ============================================================================
// Market Data
// ============================================================================

/// Symbol properties.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolInfoResponse {
    /// Symbol name.
    pub name: String,
    /// Whether the symbol is in the watch list.
    pub visible: bool,
    /// Minimum price change.
    pub trade_tick_size: Decimal,
    /// Value of one tick for one lot.
    pub trade_tick_value: Decimal,
    /// Volume step.
    pub volume_step: Decimal,
    /// Minimum volume.
    pub volume_min: Decimal,
    /// Point size.
    pub point: Decimal,
}

impl SymbolInfoResponse {
    /// Convert to the domain shape.
    pub fn into_symbol_info(self) -> SymbolInfo {
        SymbolInfo {
            name: Symbol::new(self.name),
            visible: self.visible,
            tick_size: self.trade_tick_size,
            tick_value: self.trade_tick_value,
            volume_step: self.volume_step,
            volume_min: self.volume_min,
            point: self.point,
        }
    }
}

/// Result of a symbol selection.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectResponse {
    /// Whether the symbol is now selected.
    pub selected: bool,
}

/// Account summary.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct AccountResponse {
    /// Account balance.
    pub balance: Decimal,
    /// Account equity.
    pub equity: Decimal,
    /// Deposit currency.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Last tick.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}

impl QuoteResponse {
    /// Convert to the port shape.
    pub fn into_quote(self, symbol: &Symbol) -> Quote {
        Quote {
            symbol: symbol.clone(),
            bid: self.bid,
            ask: self.ask,
        }
    }
}

// ============================================================================
// Trade Requests
// ============================================================================

/// Trade request in the terminal's native shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRequestBody {
    /// Action code.
    pub action: u8,
    /// Symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
    /// Order type code.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<u8>,
    /// Price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Stop loss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl: Option<Decimal>,
    /// Take profit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp: Option<Decimal>,
    /// Deviation in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<u32>,
    /// Magic number.
    pub magic: u64,
    /// Comment.
    pub comment: String,
    /// Position ticket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    /// Order ticket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u64>,
    /// Expiration policy code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_time: Option<u8>,
    /// Filling policy code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_filling: Option<u8>,
}

const fn action_code(action: TradeAction) -> u8 {
    match action {
        TradeAction::Deal => 1,
        TradeAction::Pending => 5,
        TradeAction::SlTp => 6,
        TradeAction::Modify => 7,
        TradeAction::Remove => 8,
    }
}

const fn order_type_code(order_type: OrderType) -> u8 {
    match order_type {
        OrderType::Buy => 0,
        OrderType::Sell => 1,
        OrderType::BuyLimit => 2,
        OrderType::SellLimit => 3,
    }
}

const fn time_code(policy: TimePolicy) -> u8 {
    match policy {
        TimePolicy::Gtc => 0,
    }
}

const fn filling_code(policy: FillPolicy) -> u8 {
    match policy {
        FillPolicy::Ioc => 1,
    }
}

impl From<&OrderRequest> for TradeRequestBody {
    fn from(request: &OrderRequest) -> Self {
        Self {
            action: action_code(request.action),
            symbol: request.symbol.as_ref().map(|s| s.as_str().to_string()),
            volume: request.volume,
            order_type: request.order_type.map(order_type_code),
            price: request.price,
            sl: request.sl,
            tp: request.tp,
            deviation: request.deviation,
            magic: request.magic,
            comment: request.comment.clone(),
            position: request.position.map(Ticket::value),
            order: request.order.map(Ticket::value),
            type_time: request.type_time.map(time_code),
            type_filling: request.type_filling.map(filling_code),
        }
    }
}

/// Terminal answer to a trade request.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeResultResponse {
    /// Return code.
    pub retcode: u32,
    /// Order ticket, 0 if none.
    #[serde(default)]
    pub order: u64,
    /// Deal ticket, 0 if none.
    #[serde(default)]
    pub deal: u64,
    /// Terminal comment.
    #[serde(default)]
    pub comment: String,
}

impl TradeResultResponse {
    /// Convert to the domain shape. The order ticket wins over the deal ticket.
    pub fn into_submit_result(self) -> SubmitResult {
        let ticket = [self.order, self.deal]
            .into_iter()
            .find(|t| *t != 0)
            .map(Ticket::new);
        SubmitResult {
            retcode: RetCode(self.retcode),
            ticket,
            comment: (!self.comment.is_empty()).then_some(self.comment),
        }
    }
}

// ============================================================================
// Books
// ============================================================================

fn price_or_none(value: Decimal) -> Option<Decimal> {
    (!value.is_zero()).then_some(value)
}

/// Pending order as listed by the terminal.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    /// Order ticket.
    pub ticket: u64,
    /// Symbol.
    pub symbol: String,
    /// Order type code.
    #[serde(rename = "type")]
    pub order_type: u8,
    /// Remaining volume.
    pub volume_current: Decimal,
    /// Order price.
    pub price_open: Decimal,
    /// Stop loss, 0 if none.
    #[serde(default)]
    pub sl: Decimal,
    /// Take profit, 0 if none.
    #[serde(default)]
    pub tp: Decimal,
    /// Magic number.
    #[serde(default)]
    pub magic: u64,
    /// Comment.
    #[serde(default)]
    pub comment: String,
}

impl OrderResponse {
    /// Convert to the domain shape.
    pub fn into_pending_order(self) -> Result<PendingOrder, BridgeError> {
        let order_type = match self.order_type {
            2 => PendingOrderType::BuyLimit,
            3 => PendingOrderType::SellLimit,
            4 => PendingOrderType::BuyStop,
            5 => PendingOrderType::SellStop,
            6 => PendingOrderType::BuyStopLimit,
            7 => PendingOrderType::SellStopLimit,
            other => {
                return Err(BridgeError::Unexpected(format!(
                    "order {} has non-pending type {other}",
                    self.ticket
                )));
            }
        };
        Ok(PendingOrder {
            ticket: Ticket::new(self.ticket),
            symbol: Symbol::new(self.symbol),
            order_type,
            volume: self.volume_current,
            price_open: self.price_open,
            sl: price_or_none(self.sl),
            tp: price_or_none(self.tp),
            magic: self.magic,
            comment: self.comment,
        })
    }
}

/// Open position as listed by the terminal.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionResponse {
    /// Position ticket.
    pub ticket: u64,
    /// Symbol.
    pub symbol: String,
    /// Position type code (0 buy, 1 sell).
    #[serde(rename = "type")]
    pub position_type: u8,
    /// Held volume.
    pub volume: Decimal,
    /// Open price.
    pub price_open: Decimal,
    /// Stop loss, 0 if none.
    #[serde(default)]
    pub sl: Decimal,
    /// Take profit, 0 if none.
    #[serde(default)]
    pub tp: Decimal,
    /// Magic number.
    #[serde(default)]
    pub magic: u64,
    /// Comment.
    #[serde(default)]
    pub comment: String,
}

impl PositionResponse {
    /// Convert to the domain shape.
    pub fn into_open_position(self) -> Result<OpenPosition, BridgeError> {
        let side = match self.position_type {
            0 => TradeSide::Long,
            1 => TradeSide::Short,
            other => {
                return Err(BridgeError::Unexpected(format!(
                    "position {} has type {other}",
                    self.ticket
                )));
            }
        };
        Ok(OpenPosition {
            ticket: Ticket::new(self.ticket),
            symbol: Symbol::new(self.symbol),
            side,
            volume: self.volume,
            price_open: self.price_open,
            sl: price_or_none(self.sl),
            tp: price_or_none(self.tp),
            magic: self.magic,
            comment: self.comment,
        })
    }
}
