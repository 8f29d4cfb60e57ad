//! Alert Dispatcher
//!
//! Validates an alert and runs the lifecycle operation its command maps to.
//!
//! Validation short-circuits in this order: license, command present,
//! symbol present. A command that is present but not recognised does
//! nothing and is reported as [`OperationReport::Ignored`].

use std::sync::Arc;

use tracing::Instrument;

use super::{
    CancelOrdersUseCase, ClosePositionsUseCase, CreateOrderCommand, CreateOrderUseCase,
    OrderDefaults, UpdateStopsUseCase,
};
use crate::application::dto::OperationReport;
use crate::application::services::{TagLocks, VenueSession};
use crate::domain::alert::{Alert, AlertCommand, AlertOperation};
use crate::domain::shared::{CorrelationTag, RequestId, Symbol};
use crate::error::{EngineError, ValidationError};
use crate::observability::{record_alert_outcome, record_alert_received};

/// Settings the dispatcher needs from configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// License id alerts must carry.
    pub license_id: String,
    /// Values stamped on created requests.
    pub defaults: OrderDefaults,
}

impl std::fmt::Debug for DispatcherSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherSettings")
            .field("license_id", &"[REDACTED]")
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Entry point for decoded alerts.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    license_id: String,
    create: CreateOrderUseCase,
    cancel: CancelOrdersUseCase,
    update: UpdateStopsUseCase,
    close: ClosePositionsUseCase,
}

impl AlertDispatcher {
    /// Build the dispatcher and its use cases over one session and one
    /// shared lock registry.
    #[must_use]
    pub fn new(session: VenueSession, settings: DispatcherSettings) -> Self {
        let locks = Arc::new(TagLocks::new());
        Self {
            license_id: settings.license_id,
            create: CreateOrderUseCase::new(session.clone(), Arc::clone(&locks), settings.defaults),
            cancel: CancelOrdersUseCase::new(session.clone(), Arc::clone(&locks)),
            update: UpdateStopsUseCase::new(session.clone(), Arc::clone(&locks)),
            close: ClosePositionsUseCase::new(session, locks, settings.defaults),
        }
    }

    /// Handle one alert inside its own tracing span.
    pub async fn handle(&self, alert: Alert) -> Result<OperationReport, EngineError> {
        let request_id = RequestId::generate();
        let command_label = command_label(alert.command.as_deref());
        let span = tracing::info_span!(
            "alert",
            request_id = %request_id,
            command = command_label,
            symbol = alert.symbol.as_ref().map_or("", Symbol::as_str),
            tag = alert.comment.as_deref().unwrap_or(""),
        );

        record_alert_received(command_label);

        let result = self.dispatch(alert).instrument(span.clone()).await;

        let _entered = span.enter();
        match &result {
            Ok(OperationReport::Ignored { command }) => {
                record_alert_outcome(command_label, "IGNORED");
                tracing::warn!(command = %command, "Unknown command ignored");
            }
            Ok(report) => {
                record_alert_outcome(command_label, "OK");
                tracing::info!(
                    succeeded = report.succeeded(),
                    failed = report.failed(),
                    "Alert handled"
                );
            }
            Err(e) if e.is_local() => {
                record_alert_outcome(command_label, e.code().reason());
                tracing::warn!(code = %e.code(), error = %e, "Alert refused");
            }
            Err(e) => {
                record_alert_outcome(command_label, e.code().reason());
                tracing::error!(code = %e.code(), error = %e, "Alert failed at the venue");
            }
        }

        result
    }

    async fn dispatch(&self, alert: Alert) -> Result<OperationReport, EngineError> {
        if alert.license_id.as_deref() != Some(self.license_id.as_str()) {
            return Err(ValidationError::Unauthorized.into());
        }
        let Some(raw_command) = alert.command.as_deref() else {
            return Err(ValidationError::InvalidCommand.into());
        };
        let Some(symbol) = alert.symbol.clone().filter(|s| !s.as_str().is_empty()) else {
            return Err(ValidationError::InvalidSymbol.into());
        };
        let Ok(command) = raw_command.parse::<AlertCommand>() else {
            return Ok(OperationReport::Ignored {
                command: raw_command.to_string(),
            });
        };

        match command.operation() {
            AlertOperation::Create { side, is_limit } => {
                let submission = self
                    .create
                    .execute(CreateOrderCommand {
                        symbol,
                        side: Some(side),
                        entry: alert.price,
                        sl: alert.sl,
                        tp: alert.tp,
                        risk: alert.risk,
                        volume: alert.volume,
                        is_limit,
                        tag: alert.tag(),
                    })
                    .await?;
                Ok(OperationReport::Submitted(submission))
            }
            AlertOperation::UpdateStopTarget => {
                let tag = require_tag(&alert)?;
                let submission = self.update.execute(&tag, alert.sl, alert.tp).await?;
                Ok(OperationReport::Submitted(submission))
            }
            AlertOperation::CancelOne => {
                let tag = require_tag(&alert)?;
                let submission = self.cancel.cancel_one(&tag).await?;
                Ok(OperationReport::Submitted(submission))
            }
            AlertOperation::CancelAll => {
                let outcomes = self.cancel.cancel_all(Some(&symbol)).await?;
                Ok(OperationReport::Batch(outcomes))
            }
            AlertOperation::ClosePosition => {
                let tag = require_tag(&alert)?;
                let submission = self.close.close(&tag, alert.perc).await?;
                Ok(OperationReport::Submitted(submission))
            }
            AlertOperation::CloseAll => {
                let outcomes = self.close.close_all(Some(&symbol)).await?;
                Ok(OperationReport::Batch(outcomes))
            }
        }
    }
}

/// Tag-keyed operations cannot match anything without a tag.
fn require_tag(alert: &Alert) -> Result<CorrelationTag, EngineError> {
    alert
        .tag()
        .ok_or_else(|| EngineError::not_found(CorrelationTag::default()))
}

/// Bounded label for metrics: known commands by name, everything else lumped.
fn command_label(raw: Option<&str>) -> &'static str {
    match raw {
        None => "NONE",
        Some(raw) => raw
            .parse::<AlertCommand>()
            .map_or("UNKNOWN", |command| command.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{session, venue};
    use crate::domain::trade::{TradeAction, TradeSide};
    use crate::infrastructure::venue::PaperVenue;
    use rust_decimal_macros::dec;

    const LICENSE: &str = "lic-123";

    fn dispatcher(venue: &Arc<PaperVenue>) -> AlertDispatcher {
        AlertDispatcher::new(
            session(venue),
            DispatcherSettings {
                license_id: LICENSE.to_string(),
                defaults: OrderDefaults::default(),
            },
        )
    }

    fn alert(command: &str) -> Alert {
        Alert {
            license_id: Some(LICENSE.to_string()),
            command: Some(command.to_string()),
            symbol: Some(Symbol::new("EURUSD")),
            comment: Some("eu-1".to_string()),
            ..Alert::default()
        }
    }

    #[tokio::test]
    async fn wrong_license_is_unauthorized() {
        let venue = venue();
        let err = dispatcher(&venue)
            .handle(Alert {
                license_id: Some("other".to_string()),
                ..alert("BUY")
            })
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Validation(ValidationError::Unauthorized));
        assert_eq!(venue.listings(), 0);
    }

    #[tokio::test]
    async fn license_is_checked_before_command() {
        let venue = venue();
        let err = dispatcher(&venue)
            .handle(Alert {
                license_id: None,
                command: None,
                symbol: None,
                ..Alert::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Validation(ValidationError::Unauthorized));
    }

    #[tokio::test]
    async fn missing_command_is_invalid() {
        let venue = venue();
        let err = dispatcher(&venue)
            .handle(Alert {
                command: None,
                ..alert("BUY")
            })
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Validation(ValidationError::InvalidCommand));
    }

    #[tokio::test]
    async fn missing_symbol_is_invalid() {
        let venue = venue();
        let err = dispatcher(&venue)
            .handle(Alert {
                symbol: None,
                ..alert("CLOSEALL")
            })
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Validation(ValidationError::InvalidSymbol));
    }

    #[tokio::test]
    async fn unknown_command_is_ignored_without_venue_calls() {
        let venue = venue();
        let report = dispatcher(&venue).handle(alert("HEDGE")).await.unwrap();

        assert_eq!(
            report,
            OperationReport::Ignored {
                command: "HEDGE".to_string()
            }
        );
        assert_eq!(venue.listings(), 0);
        assert!(venue.journal().is_empty());
    }

    #[tokio::test]
    async fn buy_limit_then_update_then_cancel() {
        let venue = venue();
        let dispatcher = dispatcher(&venue);

        let created = dispatcher
            .handle(Alert {
                price: Some(dec!(1.0900)),
                sl: Some(dec!(1.0850)),
                risk: Some(dec!(1)),
                ..alert("BUYLIMIT")
            })
            .await
            .unwrap();
        assert!(matches!(created, OperationReport::Submitted(ref s) if s.action == TradeAction::Pending));

        let updated = dispatcher
            .handle(Alert {
                tp: Some(dec!(1.1100)),
                ..alert("NEWSLTPLONG")
            })
            .await
            .unwrap();
        assert!(matches!(updated, OperationReport::Submitted(ref s) if s.action == TradeAction::Modify));

        dispatcher.handle(alert("CANCELLONG")).await.unwrap();
        assert!(venue.pending_snapshot().is_empty());
    }

    #[tokio::test]
    async fn close_without_tag_is_not_found() {
        let venue = venue();
        venue.open_position("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.1), "");

        let err = dispatcher(&venue)
            .handle(Alert {
                comment: None,
                ..alert("CLOSELONG")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
        assert!(venue.journal().is_empty());
    }

    #[tokio::test]
    async fn close_all_is_scoped_to_the_alert_symbol() {
        let venue = venue();
        venue.open_position("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.1), "a");
        venue.open_position("BTCUSD", TradeSide::Long, dec!(0.1), dec!(60000), "b");

        let report = dispatcher(&venue).handle(alert("CLOSEALL")).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        let remaining = venue.positions_snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].symbol, Symbol::new("BTCUSD"));
    }

    #[tokio::test]
    async fn concurrent_alerts_on_one_tag_are_serialised() {
        let venue = venue();
        venue.set_latency(std::time::Duration::from_millis(20));
        venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "eu-1");
        let dispatcher = dispatcher(&venue);

        let (first, second) = tokio::join!(
            dispatcher.handle(alert("CANCELLONG")),
            dispatcher.handle(alert("CANCELLONG")),
        );

        // one cancels; the other finds nothing left to cancel
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(EngineError::NotFound { .. }))));
        assert_eq!(venue.journal().len(), 1);
    }

    #[tokio::test]
    async fn market_buy_opens_a_position() {
        let venue = venue();
        dispatcher(&venue)
            .handle(Alert {
                volume: Some(dec!(0.2)),
                ..alert("BUY")
            })
            .await
            .unwrap();

        let records = venue.positions_snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].side, TradeSide::Long);
        assert_eq!(records[0].comment, "eu-1");
    }
}
