//! Close Positions Use Case
//!
//! Partial or full close of a tagged position, and close-all.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::OrderDefaults;
use crate::application::dto::{Submission, TicketOutcome};
use crate::application::services::{
    CorrelationResolver, InstrumentMetadataAccessor, TagLocks, VenueSession,
};
use crate::domain::shared::{CorrelationTag, Symbol};
use crate::domain::trade::{OpenPosition, OrderRequest};
use crate::error::{EngineError, ValidationError};

const CLOSE_ALL_COMMENT: &str = "Close position";

/// Use case for closing open positions.
#[derive(Debug, Clone)]
pub struct ClosePositionsUseCase {
    session: VenueSession,
    resolver: CorrelationResolver,
    instruments: InstrumentMetadataAccessor,
    locks: Arc<TagLocks>,
    defaults: OrderDefaults,
}

impl ClosePositionsUseCase {
    /// Create the use case.
    #[must_use]
    pub fn new(session: VenueSession, locks: Arc<TagLocks>, defaults: OrderDefaults) -> Self {
        Self {
            resolver: CorrelationResolver::new(session.clone()),
            instruments: InstrumentMetadataAccessor::new(session.clone()),
            session,
            locks,
            defaults,
        }
    }

    /// Close `percent` (default 100) of the open position carrying `tag`.
    pub async fn close(
        &self,
        tag: &CorrelationTag,
        percent: Option<Decimal>,
    ) -> Result<Submission, EngineError> {
        let percent = percent.unwrap_or(dec!(100));
        if percent <= Decimal::ZERO || percent > dec!(100) {
            return Err(ValidationError::InvalidPercent { percent }.into());
        }

        let _guard = self.locks.acquire(tag).await;
        let position = self.resolver.resolve_open(tag, None).await?;

        let volume = (position.volume * percent / dec!(100))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        let minimum = self
            .instruments
            .symbol_info(&position.symbol)
            .await
            .map_err(|e| e.into_engine_error())?
            .volume_min;
        if volume.is_zero() || volume < minimum {
            tracing::warn!(
                tag = %tag,
                ticket = %position.ticket,
                volume = %volume,
                minimum = %minimum,
                "Close volume below the instrument minimum"
            );
            return Err(ValidationError::BelowMinimumVolume { volume, minimum }.into());
        }

        let comment = position.comment.clone();
        let submission = self.submit_close(&position, volume, &comment).await?;
        tracing::info!(
            tag = %tag,
            ticket = %position.ticket,
            percent = %percent,
            volume = %volume,
            "Position closed"
        );
        Ok(submission)
    }

    /// Fully close every open position, optionally for one symbol.
    ///
    /// Each position is read again under its tag lock and closed at its
    /// current volume; one that disappeared since the listing is skipped.
    pub async fn close_all(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<TicketOutcome>, EngineError> {
        let listed = self.session.open_positions(symbol).await?;
        tracing::info!(
            symbol = ?symbol.map(Symbol::as_str),
            count = listed.len(),
            "Closing positions"
        );

        let mut outcomes = Vec::with_capacity(listed.len());
        for listed in listed {
            let _guard = self
                .locks
                .acquire(&CorrelationTag::new(listed.comment.clone()))
                .await;
            let result = match self.current_position(&listed).await {
                Ok(Some(position)) => {
                    self.submit_close(&position, position.volume, CLOSE_ALL_COMMENT)
                        .await
                }
                Ok(None) => {
                    tracing::info!(ticket = %listed.ticket, "Position already gone, skipping");
                    continue;
                }
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                tracing::warn!(ticket = %listed.ticket, error = %e, "Failed to close position");
            }
            outcomes.push(TicketOutcome {
                ticket: listed.ticket,
                result,
            });
        }

        Ok(outcomes)
    }

    async fn current_position(
        &self,
        listed: &OpenPosition,
    ) -> Result<Option<OpenPosition>, EngineError> {
        Ok(self
            .session
            .open_positions(Some(&listed.symbol))
            .await?
            .into_iter()
            .find(|p| p.ticket == listed.ticket))
    }

    async fn submit_close(
        &self,
        position: &OpenPosition,
        volume: Decimal,
        comment: &str,
    ) -> Result<Submission, EngineError> {
        let price = self
            .session
            .quote(&position.symbol)
            .await?
            .exit_price(position.side);
        let request =
            OrderRequest::close(position, volume, price, self.defaults.deviation, comment);
        let result = self.session.submit(&request).await?;
        Ok(Submission::new(&request, result))
    }
}
