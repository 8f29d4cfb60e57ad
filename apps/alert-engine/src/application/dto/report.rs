//! Operation reports.

use rust_decimal::Decimal;

use crate::domain::shared::{Symbol, Ticket};
use crate::domain::trade::{OrderRequest, RetCode, SubmitResult, TradeAction};
use crate::error::EngineError;

/// One accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Action sent.
    pub action: TradeAction,
    /// Symbol, when the request named one.
    pub symbol: Option<Symbol>,
    /// Volume sent.
    pub volume: Option<Decimal>,
    /// Price sent.
    pub price: Option<Decimal>,
    /// Venue return code.
    pub retcode: RetCode,
    /// Ticket assigned by the venue, if any.
    pub ticket: Option<Ticket>,
}

impl Submission {
    /// Pair an accepted request with the venue's answer.
    #[must_use]
    pub fn new(request: &OrderRequest, result: SubmitResult) -> Self {
        Self {
            action: request.action,
            symbol: request.symbol.clone(),
            volume: request.volume,
            price: request.price,
            retcode: result.retcode,
            ticket: result.ticket,
        }
    }
}

/// Outcome for one ticket of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketOutcome {
    /// Order or position the request targeted.
    pub ticket: Ticket,
    /// What happened.
    pub result: Result<Submission, EngineError>,
}

/// Result of handling one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationReport {
    /// A single request was accepted.
    Submitted(Submission),
    /// A bulk operation ran; each ticket succeeded or failed on its own.
    Batch(Vec<TicketOutcome>),
    /// The command is not one the engine knows; nothing was done.
    Ignored {
        /// Command as received.
        command: String,
    },
}

impl OperationReport {
    /// Number of accepted submissions.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        match self {
            Self::Submitted(_) => 1,
            Self::Batch(outcomes) => outcomes.iter().filter(|o| o.result.is_ok()).count(),
            Self::Ignored { .. } => 0,
        }
    }

    /// Number of failed submissions in a batch.
    #[must_use]
    pub fn failed(&self) -> usize {
        match self {
            Self::Batch(outcomes) => outcomes.iter().filter(|o| o.result.is_err()).count(),
            Self::Submitted(_) | Self::Ignored { .. } => 0,
        }
    }
}
