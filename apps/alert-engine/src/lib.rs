// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Alert Engine - Rust Core Library
//!
//! Turns inbound trading alerts into risk-sized venue orders and keeps the
//! resulting pending orders and open positions in step with follow-up
//! alerts. Every order carries a caller-supplied correlation tag in its
//! comment; later alerts find their target through that tag alone.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: deterministic business types
//!   - `alert`: alert payload and command table
//!   - `instrument`: symbol metadata
//!   - `sizing`: risk-based position sizing
//!   - `trade`: records, order requests, submission results
//!
//! - **Application**: use cases and orchestration
//!   - `ports`: the `VenuePort` interface
//!   - `services`: venue session, metadata accessor, correlation resolver, tag locks
//!   - `use_cases`: create, update stops, cancel, close, and the alert dispatcher
//!   - `dto`: operation reports
//!
//! - **Infrastructure**: adapters
//!   - `venue`: paper venue and HTTP terminal bridge
//!   - `transport`: websocket alert listener
//!
//! Cross-cutting: `config` (YAML + env interpolation), `observability`
//! (tracing, OTLP, Prometheus) and `error` (engine error taxonomy).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Engine error taxonomy.
pub mod error;

/// Logging, tracing export and metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::alert::{Alert, AlertCommand, AlertOperation};
pub use domain::shared::{CorrelationTag, Symbol, Ticket};
pub use domain::sizing::PositionSizer;
pub use domain::trade::{OrderRequest, RetCode, SubmitResult, TradeRecord, TradeSide};

// Application re-exports
pub use application::dto::OperationReport;
pub use application::ports::{Quote, VenueError, VenuePort};
pub use application::services::{CorrelationResolver, VenueSession};
pub use application::use_cases::{AlertDispatcher, DispatcherSettings, OrderDefaults};

// Infrastructure re-exports
pub use infrastructure::transport::{AlertListener, ListenerConfig};
pub use infrastructure::venue::{BridgeConfig, BridgeVenueAdapter, PaperSymbol, PaperVenue};

// Cross-cutting re-exports
pub use config::{Config, ConfigError, load_config};
pub use error::{EngineError, ErrorCode};
