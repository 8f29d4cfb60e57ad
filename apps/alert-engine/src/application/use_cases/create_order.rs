//! Create Order Use Case
//!
//! Market deal or pending limit order, sized from account risk when a risk
//! percentage is given.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::OrderDefaults;
use crate::application::dto::Submission;
use crate::application::services::{InstrumentMetadataAccessor, TagLocks, VenueSession};
use crate::domain::shared::{CorrelationTag, Symbol};
use crate::domain::sizing::{PositionSizer, SizingError, SizingRequest};
use crate::domain::trade::{EntryParams, OrderRequest, TradeSide};
use crate::error::{EngineError, ValidationError};

/// Parameters of a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOrderCommand {
    /// Symbol.
    pub symbol: Symbol,
    /// Explicit side; derived from entry and stop when absent.
    pub side: Option<TradeSide>,
    /// Entry price. Required for limit orders.
    pub entry: Option<Decimal>,
    /// Stop loss.
    pub sl: Option<Decimal>,
    /// Take profit.
    pub tp: Option<Decimal>,
    /// Account risk in percent.
    pub risk: Option<Decimal>,
    /// Explicit volume, used when no risk is given.
    pub volume: Option<Decimal>,
    /// Pending limit order instead of a market deal.
    pub is_limit: bool,
    /// Correlation tag.
    pub tag: Option<CorrelationTag>,
}

impl CreateOrderCommand {
    fn side(&self) -> Result<TradeSide, ValidationError> {
        if let Some(side) = self.side {
            return Ok(side);
        }
        match (self.entry, self.sl) {
            (Some(entry), Some(sl)) => Ok(TradeSide::from_entry_and_stop(entry, sl)),
            _ => Err(ValidationError::MissingDirection),
        }
    }
}

/// Use case for opening positions and placing limit orders.
#[derive(Debug, Clone)]
pub struct CreateOrderUseCase {
    session: VenueSession,
    instruments: InstrumentMetadataAccessor,
    locks: Arc<TagLocks>,
    sizer: PositionSizer,
    defaults: OrderDefaults,
}

impl CreateOrderUseCase {
    /// Create the use case.
    #[must_use]
    pub fn new(session: VenueSession, locks: Arc<TagLocks>, defaults: OrderDefaults) -> Self {
        Self {
            instruments: InstrumentMetadataAccessor::new(session.clone()),
            session,
            locks,
            sizer: PositionSizer::new(),
            defaults,
        }
    }

    /// Validate, size and submit one entry.
    pub async fn execute(&self, command: CreateOrderCommand) -> Result<Submission, EngineError> {
        let side = command.side()?;
        if command.is_limit && command.entry.is_none() {
            return Err(ValidationError::MissingEntryPrice.into());
        }
        let sizing = sizing_inputs(&command)?;

        let comment = command.tag.clone().unwrap_or_else(|| default_comment(side));
        let _guard = self.locks.acquire(&comment).await;

        // market deals go out at the touch; limits at the requested price
        let market_price = if command.is_limit {
            None
        } else {
            Some(self.session.quote(&command.symbol).await?.entry_price(side))
        };

        let volume = match sizing {
            Some((risk, sl)) => {
                let sizing_entry = command.entry.or(market_price).unwrap_or(sl);
                self.sized_volume(&command.symbol, sizing_entry, sl, risk).await?
            }
            None => command.volume.ok_or(ValidationError::MissingVolume)?,
        };

        let entry = EntryParams {
            symbol: command.symbol.clone(),
            side,
            volume,
            price: market_price.or(command.entry).unwrap_or_default(),
            sl: command.sl,
            tp: command.tp,
            comment: comment.into_inner(),
        };
        let request = if command.is_limit {
            OrderRequest::pending(entry, self.defaults.magic, self.defaults.deviation)
        } else {
            OrderRequest::market(entry, self.defaults.magic, self.defaults.deviation)
        };

        tracing::info!(
            symbol = %command.symbol,
            side = %side,
            volume = %volume,
            limit = command.is_limit,
            comment = %request.comment,
            "Submitting entry"
        );

        let result = self.session.submit(&request).await?;
        Ok(Submission::new(&request, result))
    }

    async fn sized_volume(
        &self,
        symbol: &Symbol,
        entry: Decimal,
        stop: Decimal,
        risk: Decimal,
    ) -> Result<Decimal, EngineError> {
        let metadata = self
            .instruments
            .metadata(symbol)
            .await
            .map_err(|e| e.into_sizing_error())?;
        let equity = self.session.account_equity().await?;

        let sizing = self.sizer.size(
            &SizingRequest {
                symbol: symbol.clone(),
                entry_price: entry,
                stop_price: stop,
                risk_percent: risk,
                account_balance: equity,
            },
            &metadata,
        )?;

        tracing::debug!(
            symbol = %symbol,
            equity = %equity,
            risk_amount = %sizing.risk_amount,
            stop_distance = %sizing.stop_distance,
            value_per_step = %sizing.value_per_step,
            raw_volume = %sizing.raw_volume,
            volume = %sizing.volume,
            "Position sized"
        );

        if sizing.volume.is_zero() || sizing.volume < metadata.volume_min() {
            return Err(ValidationError::BelowMinimumVolume {
                volume: sizing.volume,
                minimum: metadata.volume_min(),
            }
            .into());
        }

        Ok(sizing.volume)
    }
}

/// Risk and stop to size from, or `None` to use the explicit volume.
///
/// An unusable risk setting only fails when there is no volume to fall
/// back on.
fn sizing_inputs(
    command: &CreateOrderCommand,
) -> Result<Option<(Decimal, Decimal)>, EngineError> {
    let Some(risk) = command.risk else {
        return match command.volume {
            Some(_) => Ok(None),
            None => Err(ValidationError::MissingVolume.into()),
        };
    };

    let usable = PositionSizer::validate_risk(risk).and_then(|risk| {
        command
            .sl
            .map(|sl| (risk, sl))
            .ok_or(SizingError::MissingStopLoss)
    });
    match (usable, command.volume) {
        (Ok(inputs), _) => Ok(Some(inputs)),
        (Err(e), Some(volume)) => {
            tracing::debug!(
                error = %e,
                volume = %volume,
                "Risk sizing not possible, using explicit volume"
            );
            Ok(None)
        }
        (Err(e), None) => Err(e.into()),
    }
}

fn default_comment(side: TradeSide) -> CorrelationTag {
    match side {
        TradeSide::Long => CorrelationTag::new("Long entry"),
        TradeSide::Short => CorrelationTag::new("Short entry"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{session, venue};
    use crate::domain::trade::{OrderType, RetCode, TradeAction};
    use rust_decimal_macros::dec;

    fn use_case(venue: &Arc<crate::infrastructure::venue::PaperVenue>) -> CreateOrderUseCase {
        CreateOrderUseCase::new(
            session(venue),
            Arc::new(TagLocks::new()),
            OrderDefaults::default(),
        )
    }

    fn btc_limit() -> CreateOrderCommand {
        CreateOrderCommand {
            symbol: Symbol::new("BTCUSD"),
            side: Some(TradeSide::Long),
            entry: Some(dec!(60000.05)),
            sl: Some(dec!(55123.45)),
            risk: Some(dec!(0.15)),
            is_limit: true,
            tag: Some(CorrelationTag::new("btc-1")),
            ..CreateOrderCommand::default()
        }
    }

    #[tokio::test]
    async fn risk_sized_limit_order() {
        let venue = venue();
        let submission = use_case(&venue).execute(btc_limit()).await.unwrap();

        assert_eq!(submission.action, TradeAction::Pending);
        assert_eq!(submission.volume, Some(dec!(0.03)));
        assert_eq!(submission.price, Some(dec!(60000.05)));

        let sent = venue.journal();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].order_type, Some(OrderType::BuyLimit));
        assert_eq!(sent[0].comment, "btc-1");
        assert_eq!(sent[0].magic, 729_343);
        assert_eq!(venue.pending_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn market_order_is_priced_from_the_quote() {
        let venue = venue();
        let command = CreateOrderCommand {
            symbol: Symbol::new("EURUSD"),
            side: Some(TradeSide::Short),
            volume: Some(dec!(0.5)),
            tag: None,
            ..CreateOrderCommand::default()
        };

        let submission = use_case(&venue).execute(command).await.unwrap();

        assert_eq!(submission.action, TradeAction::Deal);
        assert_eq!(submission.price, Some(dec!(1.1000)));
        let sent = venue.journal();
        assert_eq!(sent[0].order_type, Some(OrderType::Sell));
        assert_eq!(sent[0].comment, "Short entry");
        assert_eq!(venue.positions_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn side_is_derived_from_entry_and_stop() {
        let venue = venue();
        let command = CreateOrderCommand {
            side: None,
            entry: Some(dec!(50000)),
            sl: Some(dec!(51000)),
            ..btc_limit()
        };

        use_case(&venue).execute(command).await.unwrap();

        assert_eq!(venue.journal()[0].order_type, Some(OrderType::SellLimit));
    }

    #[tokio::test]
    async fn entry_equal_to_stop_derives_short() {
        let venue = venue();
        let command = CreateOrderCommand {
            side: None,
            entry: Some(dec!(50000)),
            sl: Some(dec!(50000)),
            risk: None,
            volume: Some(dec!(0.05)),
            ..btc_limit()
        };

        use_case(&venue).execute(command).await.unwrap();

        assert_eq!(venue.journal()[0].order_type, Some(OrderType::SellLimit));
    }

    #[tokio::test]
    async fn missing_direction_makes_no_venue_call() {
        let venue = venue();
        let command = CreateOrderCommand {
            side: None,
            sl: None,
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();

        assert_eq!(err, EngineError::Validation(ValidationError::MissingDirection));
        assert!(venue.journal().is_empty());
    }

    #[tokio::test]
    async fn invalid_risk_is_rejected_before_sizing() {
        let venue = venue();
        let command = CreateOrderCommand {
            risk: Some(dec!(0)),
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();

        assert!(matches!(err, EngineError::Sizing(SizingError::InvalidRisk { .. })));
        assert!(venue.journal().is_empty());
    }

    #[tokio::test]
    async fn risk_without_stop_loss_fails() {
        let venue = venue();
        let command = CreateOrderCommand {
            sl: None,
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();
        assert_eq!(err, EngineError::Sizing(SizingError::MissingStopLoss));
    }

    #[tokio::test]
    async fn explicit_volume_is_used_when_stop_loss_is_missing() {
        let venue = venue();
        let command = CreateOrderCommand {
            symbol: Symbol::new("EURUSD"),
            side: Some(TradeSide::Long),
            risk: Some(dec!(1)),
            volume: Some(dec!(0.1)),
            sl: None,
            ..CreateOrderCommand::default()
        };

        let submission = use_case(&venue).execute(command).await.unwrap();

        assert_eq!(submission.volume, Some(dec!(0.1)));
        assert_eq!(venue.positions_snapshot()[0].volume, dec!(0.1));
    }

    #[tokio::test]
    async fn explicit_volume_is_used_when_risk_is_out_of_range() {
        let venue = venue();
        let command = CreateOrderCommand {
            symbol: Symbol::new("EURUSD"),
            side: Some(TradeSide::Long),
            risk: Some(dec!(0)),
            volume: Some(dec!(0.1)),
            sl: Some(dec!(1.09)),
            ..CreateOrderCommand::default()
        };

        let submission = use_case(&venue).execute(command).await.unwrap();

        assert_eq!(submission.volume, Some(dec!(0.1)));
        assert_eq!(venue.journal()[0].sl, Some(dec!(1.09)));
    }

    #[tokio::test]
    async fn limit_without_entry_fails() {
        let venue = venue();
        let command = CreateOrderCommand {
            entry: None,
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();
        assert_eq!(err, EngineError::Validation(ValidationError::MissingEntryPrice));
    }

    #[tokio::test]
    async fn neither_risk_nor_volume_fails() {
        let venue = venue();
        let command = CreateOrderCommand {
            risk: None,
            volume: None,
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();
        assert_eq!(err, EngineError::Validation(ValidationError::MissingVolume));
    }

    #[tokio::test]
    async fn sized_volume_below_minimum_is_not_submitted() {
        let venue = venue();
        let command = CreateOrderCommand {
            risk: Some(dec!(0.001)),
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::BelowMinimumVolume { .. })
        ));
        assert!(venue.journal().is_empty());
    }

    #[tokio::test]
    async fn unknown_symbol_makes_sizing_unavailable() {
        let venue = venue();
        let command = CreateOrderCommand {
            symbol: Symbol::new("DOGEUSD"),
            ..btc_limit()
        };

        let err = use_case(&venue).execute(command).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Sizing(SizingError::SizingUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn venue_rejection_is_reported_once() {
        let venue = venue();
        venue.respond_next(Some(RetCode::NO_MONEY));

        let err = use_case(&venue).execute(btc_limit()).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::VenueRejected {
                retcode: RetCode::NO_MONEY,
                ..
            }
        ));
        assert_eq!(venue.journal().len(), 1);
        assert!(venue.pending_snapshot().is_empty());
    }
}
