//! Alert WebSocket Listener
//!
//! Connects to the alert feed, decodes every text frame as an [`Alert`] and
//! hands it to the dispatcher on its own task, so alerts for different tags
//! run concurrently. Frames that do not decode are logged and skipped.
//!
//! The connection is re-established with exponential backoff until the
//! cancellation token fires. On cancellation the listener stops reading and
//! waits for alerts already in flight.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::application::use_cases::AlertDispatcher;
use crate::domain::alert::Alert;
use crate::observability::{record_malformed_alert, record_transport_reconnect};

// =============================================================================
// Error Type
// =============================================================================

/// Errors that end the listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// Reconnection attempts exhausted.
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectAttemptsExceeded,
}

// =============================================================================
// Configuration
// =============================================================================

/// Listener configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    /// WebSocket URL of the alert feed.
    pub url: String,
    /// Reconnection behaviour.
    pub reconnect: ReconnectConfig,
}

impl ListenerConfig {
    /// Configuration with default reconnection behaviour.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

// =============================================================================
// Listener
// =============================================================================

/// WebSocket alert listener.
pub struct AlertListener {
    config: ListenerConfig,
    dispatcher: AlertDispatcher,
    cancel: CancellationToken,
    in_flight: TaskTracker,
}

impl AlertListener {
    /// Create a listener feeding `dispatcher`.
    #[must_use]
    pub fn new(
        config: ListenerConfig,
        dispatcher: AlertDispatcher,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            dispatcher,
            cancel,
            in_flight: TaskTracker::new(),
        }
    }

    /// Run until cancelled or until reconnection attempts are exhausted.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::MaxReconnectAttemptsExceeded` when a bounded
    /// reconnect policy gives up.
    pub async fn run(self) -> Result<(), ListenerError> {
        let result = self.connection_loop().await;

        self.in_flight.close();
        if !self.in_flight.is_empty() {
            tracing::info!(
                in_flight = self.in_flight.len(),
                "Waiting for in-flight alerts"
            );
        }
        self.in_flight.wait().await;

        result
    }

    async fn connection_loop(&self) -> Result<(), ListenerError> {
        let mut policy = ReconnectPolicy::new(self.config.reconnect.clone());

        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            match self.connect_and_run(&mut policy).await {
                Ok(()) => {
                    tracing::info!("Alert listener cancelled");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        url = %self.config.url,
                        "Alert feed connection lost"
                    );

                    let Some(delay) = policy.next_delay() else {
                        tracing::error!(
                            attempts = policy.attempt_count(),
                            "Giving up on the alert feed"
                        );
                        return Err(ListenerError::MaxReconnectAttemptsExceeded);
                    };
                    record_transport_reconnect();
                    tracing::info!(
                        attempt = policy.attempt_count(),
                        delay_ms = delay.as_millis(),
                        "Reconnecting to alert feed"
                    );

                    tokio::select! {
                        () = self.cancel.cancelled() => return Ok(()),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Connect and read frames until error or cancellation.
    async fn connect_and_run(&self, policy: &mut ReconnectPolicy) -> Result<(), ListenerError> {
        tracing::info!(url = %self.config.url, "Connecting to alert feed");

        let (ws_stream, _response) = tokio::select! {
            () = self.cancel.cancelled() => return Ok(()),
            connected = tokio_tungstenite::connect_async(self.config.url.as_str()) => connected?,
        };
        let (mut write, mut read) = ws_stream.split();

        policy.reset();
        tracing::info!(url = %self.config.url, "Alert feed connected");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()),
                        Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                            Ok(text) => self.handle_frame(text),
                            Err(_) => {
                                record_malformed_alert();
                                tracing::warn!(len = data.len(), "Non-UTF8 alert frame skipped");
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Alert feed sent close frame");
                            return Err(ListenerError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(ListenerError::ConnectionClosed),
                    }
                }
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        let alert = match serde_json::from_str::<Alert>(text) {
            Ok(alert) => alert,
            Err(e) => {
                record_malformed_alert();
                tracing::warn!(error = %e, len = text.len(), "Malformed alert frame skipped");
                return;
            }
        };

        let dispatcher = self.dispatcher.clone();
        self.in_flight.spawn(async move {
            // outcome is logged and counted inside the dispatcher span
            let _ = dispatcher.handle(alert).await;
        });
    }
}
