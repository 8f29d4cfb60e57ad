//! Alert Lifecycle Integration Tests
//!
//! Raw JSON alerts, as the transport receives them, flow through the
//! dispatcher into the paper venue. Each scenario follows one logical trade
//! from entry to exit using only its correlation tag.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use alert_engine::application::ports::VenuePort;
use alert_engine::domain::trade::{PendingOrderType, TradeAction, TradeSide};
use alert_engine::error::ValidationError;
use alert_engine::infrastructure::venue::{PaperSymbol, PaperVenue};
use alert_engine::{
    Alert, AlertDispatcher, DispatcherSettings, EngineError, OperationReport, OrderDefaults,
    RetCode, Symbol, VenueSession,
};
use rust_decimal_macros::dec;

const LICENSE: &str = "integration-license";

// =============================================================================
// Fixtures
// =============================================================================

fn paper_venue() -> Arc<PaperVenue> {
    Arc::new(
        PaperVenue::new(dec!(10000))
            .with_symbol(PaperSymbol::new("EURUSD", dec!(1.1000), dec!(1.1002)))
            .with_symbol(PaperSymbol {
                tick_size: dec!(0.01),
                tick_value: dec!(0.01),
                point: dec!(0.01),
                ..PaperSymbol::new("BTCUSD", dec!(60000.00), dec!(60000.05))
            }),
    )
}

async fn engine(venue: &Arc<PaperVenue>) -> AlertDispatcher {
    let port: Arc<dyn VenuePort> = Arc::clone(venue) as Arc<dyn VenuePort>;
    let session = VenueSession::open(port, Duration::from_secs(1))
        .await
        .expect("paper venue always logs in");
    AlertDispatcher::new(
        session,
        DispatcherSettings {
            license_id: LICENSE.to_string(),
            defaults: OrderDefaults::default(),
        },
    )
}

/// Decode a JSON alert the way the websocket listener does.
fn alert(json: serde_json::Value) -> Alert {
    let mut json = json;
    json["licenseId"] = serde_json::Value::String(LICENSE.to_string());
    serde_json::from_value(json).expect("fixture alert decodes")
}

fn submitted(report: &OperationReport) -> &alert_engine::application::dto::Submission {
    match report {
        OperationReport::Submitted(submission) => submission,
        other => panic!("expected a single submission, got {other:?}"),
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn limit_entry_fills_then_trails_then_scales_out() {
    let venue = paper_venue();
    let dispatcher = engine(&venue).await;

    // 1% of 10k over a 50 pip stop sizes to 0.2 lots
    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "BUYLIMIT",
            "symbol": "EURUSD",
            "price": "1.0900",
            "sl": "1.0850",
            "tp": "1.1000",
            "risk": "1",
            "comment": "eu-swing-1"
        })))
        .await
        .unwrap();
    let created = submitted(&report);
    assert_eq!(created.action, TradeAction::Pending);
    assert_eq!(created.volume, Some(dec!(0.2)));
    assert_eq!(created.retcode, RetCode::DONE);

    let pending = venue.pending_snapshot();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].order_type, PendingOrderType::BuyLimit);
    assert_eq!(pending[0].comment, "eu-swing-1");

    // trail the stop while still resting
    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "NEWSLTPLONG",
            "symbol": "EURUSD",
            "sl": "1.0870",
            "comment": "eu-swing-1"
        })))
        .await
        .unwrap();
    assert_eq!(submitted(&report).action, TradeAction::Modify);

    // the order fills; the same tag now finds the position
    venue.fill_pending(pending[0].ticket).unwrap();
    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "NEWSLTPLONG",
            "symbol": "EURUSD",
            "tp": "1.1100",
            "comment": "eu-swing-1"
        })))
        .await
        .unwrap();
    assert_eq!(submitted(&report).action, TradeAction::SlTp);
    assert_eq!(venue.positions_snapshot()[0].tp, Some(dec!(1.1100)));

    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "CLOSELONG",
            "symbol": "EURUSD",
            "perc": 50,
            "comment": "eu-swing-1"
        })))
        .await
        .unwrap();
    let closed = submitted(&report);
    assert_eq!(closed.action, TradeAction::Deal);
    assert_eq!(closed.volume, Some(dec!(0.1)));

    let positions = venue.positions_snapshot();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].volume, dec!(0.1));

    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "CLOSEALL",
            "symbol": "EURUSD"
        })))
        .await
        .unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 0);
    assert!(venue.positions_snapshot().is_empty());
}

#[tokio::test]
async fn market_sell_is_sized_from_the_bid() {
    let venue = paper_venue();
    let dispatcher = engine(&venue).await;

    // 2% of 10k over a 500.00 stop at 0.01 value per tick sizes to 0.4 lots
    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "SELL",
            "symbol": "BTCUSD",
            "sl": 60500,
            "risk": 2,
            "comment": "btc-short-7"
        })))
        .await
        .unwrap();

    let sold = submitted(&report);
    assert_eq!(sold.action, TradeAction::Deal);
    assert_eq!(sold.volume, Some(dec!(0.4)));
    assert_eq!(sold.price, Some(dec!(60000.00)));

    let positions = venue.positions_snapshot();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].side, TradeSide::Short);
    assert_eq!(positions[0].comment, "btc-short-7");
}

#[tokio::test]
async fn cancel_all_only_touches_the_alert_symbol() {
    let venue = paper_venue();
    venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.09), "eu-a");
    venue.place_pending("EURUSD", TradeSide::Short, dec!(0.1), dec!(1.12), "eu-b");
    venue.place_pending("BTCUSD", TradeSide::Long, dec!(0.1), dec!(55000), "btc-a");
    let dispatcher = engine(&venue).await;

    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "CANCELALL",
            "symbol": "EURUSD"
        })))
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    let remaining = venue.pending_snapshot();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].symbol, Symbol::new("BTCUSD"));
}

#[tokio::test]
async fn cancel_by_tag_removes_only_the_tagged_order() {
    let venue = paper_venue();
    venue.place_pending("EURUSD", TradeSide::Short, dec!(0.1), dec!(1.12), "eu-short");
    venue.place_pending("EURUSD", TradeSide::Short, dec!(0.1), dec!(1.13), "eu-other");
    let dispatcher = engine(&venue).await;

    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "CANCELSHORT",
            "symbol": "EURUSD",
            "comment": "eu-short"
        })))
        .await
        .unwrap();

    assert_eq!(submitted(&report).action, TradeAction::Remove);
    let remaining = venue.pending_snapshot();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].comment, "eu-other");
}

#[tokio::test]
async fn venue_rejection_surfaces_the_return_code() {
    let venue = paper_venue();
    venue.respond_next(Some(RetCode::INVALID_STOPS));
    let dispatcher = engine(&venue).await;

    let err = dispatcher
        .handle(alert(serde_json::json!({
            "command": "BUY",
            "symbol": "EURUSD",
            "qty": "0.5",
            "sl": "1.2000",
            "comment": "bad-stops"
        })))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::VenueRejected { retcode, .. } if retcode == RetCode::INVALID_STOPS
    ));
    assert!(venue.positions_snapshot().is_empty());
}

#[tokio::test]
async fn missing_venue_answer_is_an_unknown_outcome() {
    let venue = paper_venue();
    venue.respond_next(None);
    let dispatcher = engine(&venue).await;

    let err = dispatcher
        .handle(alert(serde_json::json!({
            "command": "BUY",
            "symbol": "EURUSD",
            "qty": "0.5",
            "comment": "lost"
        })))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::VenueUnknown { .. }));
}

#[tokio::test]
async fn refused_alerts_never_reach_the_venue() {
    let venue = paper_venue();
    let dispatcher = engine(&venue).await;

    let mut wrong_license = alert(serde_json::json!({
        "command": "BUY",
        "symbol": "EURUSD",
        "qty": "0.1"
    }));
    wrong_license.license_id = Some("someone-else".to_string());
    let err = dispatcher.handle(wrong_license).await.unwrap_err();
    assert_eq!(err, EngineError::Validation(ValidationError::Unauthorized));

    let err = dispatcher
        .handle(alert(serde_json::json!({
            "command": "BUYLIMIT",
            "symbol": "EURUSD",
            "sl": "1.0850",
            "risk": "1"
        })))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::MissingEntryPrice)
    );

    let report = dispatcher
        .handle(alert(serde_json::json!({
            "command": "REVERSE",
            "symbol": "EURUSD"
        })))
        .await
        .unwrap();
    assert!(matches!(report, OperationReport::Ignored { .. }));

    assert!(venue.journal().is_empty());
}

#[tokio::test]
async fn tag_follow_up_without_a_match_is_not_found() {
    let venue = paper_venue();
    let dispatcher = engine(&venue).await;

    let err = dispatcher
        .handle(alert(serde_json::json!({
            "command": "CLOSESHORT",
            "symbol": "EURUSD",
            "comment": "never-opened"
        })))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound { .. }));
    assert!(venue.journal().is_empty());
}

#[tokio::test]
async fn close_all_racing_a_partial_close_leaves_nothing_open() {
    let venue = paper_venue();
    venue.open_position("EURUSD", TradeSide::Long, dec!(0.30), dec!(1.09), "eu");
    venue.set_latency(Duration::from_millis(20));
    let dispatcher = engine(&venue).await;

    let (all, _partial) = tokio::join!(
        dispatcher.handle(alert(serde_json::json!({
            "command": "CLOSEALL",
            "symbol": "EURUSD"
        }))),
        dispatcher.handle(alert(serde_json::json!({
            "command": "CLOSELONG",
            "symbol": "EURUSD",
            "perc": 50,
            "comment": "eu"
        })))
    );

    assert_eq!(all.unwrap().failed(), 0);
    assert!(venue.positions_snapshot().is_empty());
}
