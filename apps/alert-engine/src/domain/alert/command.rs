//! Alert commands and the operation each one maps to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::trade::TradeSide;

/// Every command an alert may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertCommand {
    /// Market buy.
    #[serde(rename = "BUY")]
    Buy,
    /// Market sell.
    #[serde(rename = "SELL")]
    Sell,
    /// Pending buy limit.
    #[serde(rename = "BUYLIMIT")]
    BuyLimit,
    /// Pending sell limit.
    #[serde(rename = "SELLLIMIT")]
    SellLimit,
    /// New stop/target for a long trade.
    #[serde(rename = "NEWSLTPLONG")]
    NewSlTpLong,
    /// New stop/target for a short trade.
    #[serde(rename = "NEWSLTPSHORT")]
    NewSlTpShort,
    /// Cancel a pending long entry.
    #[serde(rename = "CANCELLONG")]
    CancelLong,
    /// Cancel a pending short entry.
    #[serde(rename = "CANCELSHORT")]
    CancelShort,
    /// Cancel every pending limit order.
    #[serde(rename = "CANCELALL")]
    CancelAll,
    /// Close (part of) a long position.
    #[serde(rename = "CLOSELONG")]
    CloseLong,
    /// Close (part of) a short position.
    #[serde(rename = "CLOSESHORT")]
    CloseShort,
    /// Close every open position.
    #[serde(rename = "CLOSEALL")]
    CloseAll,
}

/// Lifecycle operation selected by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOperation {
    /// Open a position or place a pending order.
    Create {
        /// Side taken from the BUY/SELL prefix.
        side: TradeSide,
        /// Limit variants place a pending order.
        is_limit: bool,
    },
    /// Move stop and/or target of a tagged trade.
    UpdateStopTarget,
    /// Cancel one tagged pending order.
    CancelOne,
    /// Cancel all pending limit orders for the symbol.
    CancelAll,
    /// Close (part of) one tagged position.
    ClosePosition,
    /// Close all open positions for the symbol.
    CloseAll,
}

impl AlertCommand {
    /// All known commands, in wire-table order.
    pub const ALL: [Self; 12] = [
        Self::Buy,
        Self::Sell,
        Self::BuyLimit,
        Self::SellLimit,
        Self::NewSlTpLong,
        Self::NewSlTpShort,
        Self::CancelLong,
        Self::CancelShort,
        Self::CancelAll,
        Self::CloseLong,
        Self::CloseShort,
        Self::CloseAll,
    ];

    /// Wire name of the command.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::BuyLimit => "BUYLIMIT",
            Self::SellLimit => "SELLLIMIT",
            Self::NewSlTpLong => "NEWSLTPLONG",
            Self::NewSlTpShort => "NEWSLTPSHORT",
            Self::CancelLong => "CANCELLONG",
            Self::CancelShort => "CANCELSHORT",
            Self::CancelAll => "CANCELALL",
            Self::CloseLong => "CLOSELONG",
            Self::CloseShort => "CLOSESHORT",
            Self::CloseAll => "CLOSEALL",
        }
    }

    /// The lifecycle operation this command dispatches to.
    #[must_use]
    pub const fn operation(&self) -> AlertOperation {
        match self {
            Self::Buy => AlertOperation::Create {
                side: TradeSide::Long,
                is_limit: false,
            },
            Self::Sell => AlertOperation::Create {
                side: TradeSide::Short,
                is_limit: false,
            },
            Self::BuyLimit => AlertOperation::Create {
                side: TradeSide::Long,
                is_limit: true,
            },
            Self::SellLimit => AlertOperation::Create {
                side: TradeSide::Short,
                is_limit: true,
            },
            Self::NewSlTpLong | Self::NewSlTpShort => AlertOperation::UpdateStopTarget,
            Self::CancelLong | Self::CancelShort => AlertOperation::CancelOne,
            Self::CancelAll => AlertOperation::CancelAll,
            Self::CloseLong | Self::CloseShort => AlertOperation::ClosePosition,
            Self::CloseAll => AlertOperation::CloseAll,
        }
    }
}

impl fmt::Display for AlertCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a command string is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alert command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for AlertCommand {
    type Err = UnknownCommand;

    /// Matching is exact: alert templates send the upper-case names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
