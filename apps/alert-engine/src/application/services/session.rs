//! Venue Session
//!
//! The single handle through which every component reaches the venue.
//! Acquired once at startup, cloned into each component, released at
//! shutdown. Each call is bounded by the configured timeout.
//!
//! Errors are mapped to the engine taxonomy here: queries that fail become
//! [`EngineError::VenueUnavailable`]; submissions that fail or time out
//! become [`EngineError::VenueUnknown`] because the request may have been
//! accepted.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use crate::application::ports::{Quote, VenueError, VenuePort};
use crate::domain::instrument::SymbolInfo;
use crate::domain::shared::Symbol;
use crate::domain::trade::{
    OpenPosition, OrderRequest, PendingOrder, SubmissionStatus, SubmitResult,
};
use crate::error::EngineError;
use crate::observability::{record_submission, record_venue_call};

/// Timeout-bounded handle to the venue.
#[derive(Clone)]
pub struct VenueSession {
    venue: Arc<dyn VenuePort>,
    timeout: Duration,
}

impl std::fmt::Debug for VenueSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueSession")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl VenueSession {
    /// Wrap a venue without opening it.
    #[must_use]
    pub fn new(venue: Arc<dyn VenuePort>, timeout: Duration) -> Self {
        Self { venue, timeout }
    }

    /// Wrap a venue and log in.
    pub async fn open(venue: Arc<dyn VenuePort>, timeout: Duration) -> Result<Self, VenueError> {
        let session = Self::new(venue, timeout);
        session.call("initialize", session.venue.initialize()).await?;
        tracing::info!(timeout_ms = session.timeout_ms(), "Venue session opened");
        Ok(session)
    }

    /// Log out.
    pub async fn close(&self) -> Result<(), VenueError> {
        self.call("shutdown", self.venue.shutdown()).await?;
        tracing::info!("Venue session closed");
        Ok(())
    }

    /// Configured per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, VenueError>
    where
        F: Future<Output = Result<T, VenueError>>,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(VenueError::Timeout {
                operation,
                after_ms: self.timeout_ms(),
            }),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(VenueError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        record_venue_call(operation, outcome, started.elapsed().as_secs_f64());

        result
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Raw symbol properties; `Ok(None)` if the venue has no such symbol.
    pub async fn symbol_info(&self, symbol: &Symbol) -> Result<Option<SymbolInfo>, EngineError> {
        self.call("symbol_info", self.venue.symbol_info(symbol))
            .await
            .map_err(unavailable)
    }

    /// Add `symbol` to the watch list.
    pub async fn select_symbol(&self, symbol: &Symbol) -> Result<bool, EngineError> {
        self.call("select_symbol", self.venue.select_symbol(symbol))
            .await
            .map_err(unavailable)
    }

    /// Current account equity.
    pub async fn account_equity(&self) -> Result<Decimal, EngineError> {
        self.call("account_equity", self.venue.account_equity())
            .await
            .map_err(unavailable)
    }

    /// Current bid/ask.
    pub async fn quote(&self, symbol: &Symbol) -> Result<Quote, EngineError> {
        self.call("quote", self.venue.quote(symbol))
            .await
            .map_err(unavailable)
    }

    /// Pending orders in venue order.
    pub async fn pending_orders(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<PendingOrder>, EngineError> {
        self.call("pending_orders", self.venue.pending_orders(symbol))
            .await
            .map_err(unavailable)
    }

    /// Open positions in venue order.
    pub async fn open_positions(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<OpenPosition>, EngineError> {
        self.call("open_positions", self.venue.open_positions(symbol))
            .await
            .map_err(unavailable)
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submit one request and classify the answer.
    ///
    /// Never retries. Only a [`SubmissionStatus::Success`] returns `Ok`.
    pub async fn submit(&self, request: &OrderRequest) -> Result<SubmitResult, EngineError> {
        let answer = self
            .call("submit_order", self.venue.submit_order(request))
            .await;

        let action = request.action.as_str();

        let result = match answer {
            Ok(result) => result,
            Err(err) => {
                record_submission(action, SubmissionStatus::Unknown.as_str());
                tracing::error!(action = %action, error = %err, "Submission outcome unknown");
                return Err(EngineError::VenueUnknown {
                    reason: err.to_string(),
                });
            }
        };

        let status = SubmissionStatus::classify(result.as_ref());
        record_submission(action, status.as_str());

        match (status, result) {
            (SubmissionStatus::Success, Some(result)) => {
                tracing::info!(
                    action = %action,
                    retcode = %result.retcode,
                    ticket = ?result.ticket,
                    "Submission accepted"
                );
                Ok(result)
            }
            (SubmissionStatus::Rejected, Some(result)) => {
                tracing::warn!(
                    action = %action,
                    retcode = %result.retcode,
                    comment = result.comment.as_deref().unwrap_or_default(),
                    "Submission rejected"
                );
                Err(EngineError::VenueRejected {
                    retcode: result.retcode,
                    message: result
                        .comment
                        .unwrap_or_else(|| "rejected by venue".to_string()),
                })
            }
            (_, result) => {
                let reason = result.map_or_else(
                    || "venue returned no result".to_string(),
                    |r| format!("venue reported retcode {}", r.retcode),
                );
                tracing::error!(action = %action, reason = %reason, "Submission outcome unknown");
                Err(EngineError::VenueUnknown { reason })
            }
        }
    }
}

fn unavailable(err: VenueError) -> EngineError {
    EngineError::VenueUnavailable {
        message: err.to_string(),
    }
}
