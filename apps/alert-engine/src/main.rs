//! Alert Engine Binary
//!
//! Connects to the alert feed and translates alerts into venue orders.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin alert-engine
//! ```
//!
//! # Environment Variables
//!
//! - `ALERT_ENGINE_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//!
//! Any `${VAR}` referenced by the config file is read from the environment,
//! after `.env` files are loaded.

use std::sync::Arc;
use std::time::Duration;

use alert_engine::application::ports::VenuePort;
use alert_engine::config::{Config, VenueKind, load_config};
use alert_engine::infrastructure::transport::AlertListener;
use alert_engine::infrastructure::venue::{BridgeVenueAdapter, PaperVenue};
use alert_engine::observability::{init_metrics, init_tracing};
use alert_engine::{AlertDispatcher, VenueSession};
use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS operations
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("rustls crypto provider already installed"))?;

    load_dotenv();

    let config = load_config(None).context("loading configuration")?;

    let _tracing_guard = init_tracing(&config.observability.to_tracing_config())
        .context("initializing tracing")?;

    if let Some(metrics) = config.observability.to_metrics_config() {
        init_metrics(&metrics).context("initializing metrics")?;
    }

    tracing::info!("Starting Alert Engine");
    log_config(&config);

    let venue = create_venue(&config)?;
    let session = VenueSession::open(venue, config.engine.venue_timeout())
        .await
        .context("opening venue session")?;

    let dispatcher = AlertDispatcher::new(session.clone(), config.engine.dispatcher_settings());
    let shutdown_token = CancellationToken::new();
    let listener = AlertListener::new(
        config.transport.to_listener_config(),
        dispatcher,
        shutdown_token.clone(),
    );
    let mut listener_handle = tokio::spawn(listener.run());

    tracing::info!("Alert engine ready");

    tokio::select! {
        () = shutdown_signal() => {
            shutdown_token.cancel();
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut listener_handle).await {
                Ok(joined) => report_listener_exit(joined),
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                        "In-flight alerts did not finish before the shutdown timeout"
                    );
                    listener_handle.abort();
                }
            }
        }
        joined = &mut listener_handle => report_listener_exit(joined),
    }

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Venue logout failed");
    }

    tracing::info!("Alert engine stopped");
    Ok(())
}

fn create_venue(config: &Config) -> anyhow::Result<Arc<dyn VenuePort>> {
    match config.venue.kind {
        VenueKind::Paper => {
            let paper = &config.venue.paper;
            let venue = PaperVenue::new(paper.equity).with_symbols(paper.symbols.iter().cloned());
            Ok(Arc::new(venue))
        }
        VenueKind::Bridge => {
            let adapter = BridgeVenueAdapter::new(&config.venue.bridge.to_bridge_config())
                .context("building bridge adapter")?;
            Ok(Arc::new(adapter))
        }
    }
}

fn report_listener_exit(
    joined: Result<
        Result<(), alert_engine::infrastructure::transport::ListenerError>,
        tokio::task::JoinError,
    >,
) {
    match joined {
        Ok(Ok(())) => tracing::info!("Alert listener stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Alert listener failed"),
        Err(e) => tracing::error!(error = %e, "Alert listener task panicked"),
    }
}

fn log_config(config: &Config) {
    tracing::info!(
        venue = %config.venue.kind,
        feed = %config.transport.url,
        magic = config.engine.magic,
        deviation = config.engine.deviation,
        venue_timeout_ms = config.engine.venue_timeout_ms,
        "Configuration loaded"
    );
    if config.venue.kind == VenueKind::Paper {
        tracing::warn!(
            symbols = config.venue.paper.symbols.len(),
            "Running against the paper venue, no orders reach a real terminal"
        );
    }
}

/// Load `.env` from the working directory or the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for SIGINT or SIGTERM.
///
/// # Panics
///
/// Panics if signal handlers cannot be installed.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
