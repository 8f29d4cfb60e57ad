//! Venue Port (Driven Port)
//!
//! Call surface of the trading terminal: symbol metadata, account equity,
//! quotes, order submission and the pending-order and position books.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::instrument::SymbolInfo;
use crate::domain::shared::Symbol;
use crate::domain::trade::{OpenPosition, OrderRequest, PendingOrder, SubmitResult, TradeSide};

/// Best bid and ask for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol.
    pub symbol: Symbol,
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}

impl Quote {
    /// Price at which a position on `side` is opened (ask for long, bid for short).
    #[must_use]
    pub const fn entry_price(&self, side: TradeSide) -> Decimal {
        match side {
            TradeSide::Long => self.ask,
            TradeSide::Short => self.bid,
        }
    }

    /// Price at which a position on `side` is closed (bid for long, ask for short).
    #[must_use]
    pub const fn exit_price(&self, side: TradeSide) -> Decimal {
        match side {
            TradeSide::Long => self.bid,
            TradeSide::Short => self.ask,
        }
    }
}

/// Venue port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VenueError {
    /// Terminal not reachable or session not established.
    #[error("venue connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// Call did not complete in time.
    #[error("venue call '{operation}' timed out after {after_ms}ms")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Elapsed budget.
        after_ms: u64,
    },

    /// Terminal answered with something unusable.
    #[error("venue protocol error: {message}")]
    Protocol {
        /// Error details.
        message: String,
    },

    /// Terminal refused a session-level request (login, symbol selection).
    #[error("venue refused request: {message}")]
    Refused {
        /// Error details.
        message: String,
    },
}

/// Port for the trading terminal.
///
/// Listing calls return records in the terminal's native order; callers
/// rely on it for first-match resolution.
#[async_trait]
pub trait VenuePort: Send + Sync {
    /// Establish the terminal session (login).
    async fn initialize(&self) -> Result<(), VenueError>;

    /// Release the terminal session.
    async fn shutdown(&self) -> Result<(), VenueError>;

    /// Symbol properties, or `None` if the terminal has no such symbol.
    async fn symbol_info(&self, symbol: &Symbol) -> Result<Option<SymbolInfo>, VenueError>;

    /// Add a symbol to the watch list. Returns whether it is now selected.
    async fn select_symbol(&self, symbol: &Symbol) -> Result<bool, VenueError>;

    /// Current account equity.
    async fn account_equity(&self) -> Result<Decimal, VenueError>;

    /// Current bid/ask.
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, VenueError>;

    /// Send one request. `None` means the terminal returned no result.
    async fn submit_order(&self, request: &OrderRequest)
    -> Result<Option<SubmitResult>, VenueError>;

    /// Pending orders, optionally restricted to one symbol.
    async fn pending_orders(&self, symbol: Option<&Symbol>)
    -> Result<Vec<PendingOrder>, VenueError>;

    /// Open positions, optionally restricted to one symbol.
    async fn open_positions(&self, symbol: Option<&Symbol>)
    -> Result<Vec<OpenPosition>, VenueError>;
}
