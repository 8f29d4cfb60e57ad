//! Cancel Orders Use Case

use std::sync::Arc;

use crate::application::dto::{Submission, TicketOutcome};
use crate::application::services::{CorrelationResolver, TagLocks, VenueSession};
use crate::domain::shared::{CorrelationTag, Symbol};
use crate::domain::trade::{OrderRequest, TradeRecord};
use crate::error::EngineError;

const CANCEL_ONE_COMMENT: &str = "Cancel order";
const CANCEL_ALL_COMMENT: &str = "Cancel all orders";

/// Use case for removing pending orders.
#[derive(Debug, Clone)]
pub struct CancelOrdersUseCase {
    session: VenueSession,
    resolver: CorrelationResolver,
    locks: Arc<TagLocks>,
}

impl CancelOrdersUseCase {
    /// Create the use case.
    #[must_use]
    pub fn new(session: VenueSession, locks: Arc<TagLocks>) -> Self {
        Self {
            resolver: CorrelationResolver::new(session.clone()),
            session,
            locks,
        }
    }

    /// Cancel the pending order carrying `tag`.
    ///
    /// Fails with `NotFound` when the tag resolves to nothing or to an open
    /// position.
    pub async fn cancel_one(&self, tag: &CorrelationTag) -> Result<Submission, EngineError> {
        let _guard = self.locks.acquire(tag).await;

        let record = self.resolver.resolve(tag, None).await?;
        if !record.is_pending() {
            tracing::info!(
                tag = %tag,
                ticket = %record.ticket,
                "Tag resolves to an open position, nothing to cancel"
            );
            return Err(EngineError::not_found(tag.clone()));
        }

        self.remove(&record, CANCEL_ONE_COMMENT).await
    }

    /// Cancel every pending limit order, optionally for one symbol.
    ///
    /// Requests go out one at a time; each ticket's outcome is reported on
    /// its own. Every order is read again under its tag lock and skipped
    /// when it has filled or been removed since the listing.
    pub async fn cancel_all(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<TicketOutcome>, EngineError> {
        let listed: Vec<TradeRecord> = self
            .session
            .pending_orders(symbol)
            .await?
            .into_iter()
            .map(TradeRecord::from)
            .filter(TradeRecord::is_pending_limit)
            .collect();

        tracing::info!(
            symbol = ?symbol.map(Symbol::as_str),
            count = listed.len(),
            "Cancelling pending limit orders"
        );

        let mut outcomes = Vec::with_capacity(listed.len());
        for listed in listed {
            let _guard = self
                .locks
                .acquire(&CorrelationTag::new(listed.comment.clone()))
                .await;
            let result = match self.current_order(&listed).await {
                Ok(Some(order)) => self.remove(&order, CANCEL_ALL_COMMENT).await,
                Ok(None) => {
                    tracing::info!(ticket = %listed.ticket, "Order no longer pending, skipping");
                    continue;
                }
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                tracing::warn!(ticket = %listed.ticket, error = %e, "Failed to cancel order");
            }
            outcomes.push(TicketOutcome {
                ticket: listed.ticket,
                result,
            });
        }

        Ok(outcomes)
    }

    async fn current_order(
        &self,
        listed: &TradeRecord,
    ) -> Result<Option<TradeRecord>, EngineError> {
        Ok(self
            .session
            .pending_orders(Some(&listed.symbol))
            .await?
            .into_iter()
            .find(|o| o.ticket == listed.ticket)
            .map(TradeRecord::from))
    }

    async fn remove(&self, order: &TradeRecord, comment: &str) -> Result<Submission, EngineError> {
        let request = OrderRequest::remove(order, comment);
        let result = self.session.submit(&request).await?;
        tracing::info!(ticket = %order.ticket, tag = %order.comment, "Pending order cancelled");
        Ok(Submission::new(&request, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{session, venue};
    use crate::domain::trade::{PendingOrderType, RetCode, TradeAction, TradeSide};
    use crate::infrastructure::venue::PaperVenue;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn use_case(venue: &Arc<PaperVenue>) -> CancelOrdersUseCase {
        CancelOrdersUseCase::new(session(venue), Arc::new(TagLocks::new()))
    }

    #[tokio::test]
    async fn cancels_the_tagged_pending_order() {
        let venue = venue();
        let ticket = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "eu-1");

        let submission = use_case(&venue)
            .cancel_one(&CorrelationTag::new("eu-1"))
            .await
            .unwrap();

        assert_eq!(submission.action, TradeAction::Remove);
        let sent = venue.journal();
        assert_eq!(sent[0].order, Some(ticket));
        assert_eq!(sent[0].comment, "Cancel order");
        assert!(venue.pending_snapshot().is_empty());
    }

    #[tokio::test]
    async fn open_position_is_not_cancellable() {
        let venue = venue();
        venue.open_position("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.1), "eu-1");

        let err = use_case(&venue)
            .cancel_one(&CorrelationTag::new("eu-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
        assert!(venue.journal().is_empty());
    }

    #[tokio::test]
    async fn cancel_all_targets_each_limit_order_once() {
        let venue = venue();
        let a = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "a");
        let b = venue.place_pending("BTCUSD", TradeSide::Short, dec!(0.1), dec!(61000), "b");
        venue.place_pending_typed("EURUSD", PendingOrderType::BuyStop, dec!(0.1), dec!(1.2), "stop");

        let outcomes = use_case(&venue).cancel_all(None).await.unwrap();

        let tickets: Vec<_> = outcomes.iter().map(|o| o.ticket).collect();
        assert_eq!(tickets, vec![a, b]);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(venue.journal().len(), 2);
        assert!(venue.journal().iter().all(|r| r.comment == "Cancel all orders"));
        assert_eq!(venue.pending_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn one_failure_does_not_block_the_rest() {
        let venue = venue();
        let a = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "a");
        let b = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.08), "b");
        venue.respond_next(Some(RetCode::REJECT));

        let outcomes = use_case(&venue).cancel_all(None).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].ticket, a);
        assert!(matches!(outcomes[0].result, Err(EngineError::VenueRejected { .. })));
        assert_eq!(outcomes[1].ticket, b);
        assert!(outcomes[1].result.is_ok());
    }

    #[tokio::test]
    async fn cancel_all_respects_symbol_filter() {
        let venue = venue();
        venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "a");
        let b = venue.place_pending("BTCUSD", TradeSide::Long, dec!(0.1), dec!(59000), "b");

        let outcomes = use_case(&venue)
            .cancel_all(Some(&Symbol::new("BTCUSD")))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].ticket, b);
    }

    #[tokio::test]
    async fn cancel_all_skips_an_order_filled_meanwhile() {
        let venue = venue();
        let a = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "a");
        let b = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.08), "b");
        venue.set_latency(Duration::from_millis(20));
        let use_case = use_case(&venue);

        // the fill lands after the listing and before order b is read again
        let (outcomes, ()) = tokio::join!(use_case.cancel_all(None), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            venue.fill_pending(b);
        });

        let outcomes = outcomes.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].ticket, a);
        assert_eq!(venue.journal().len(), 1);
        assert_eq!(venue.positions_snapshot()[0].ticket, b);
    }
}
