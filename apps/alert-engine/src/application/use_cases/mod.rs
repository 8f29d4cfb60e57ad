//! Use Cases
//!
//! The lifecycle operations on one logical trade and the dispatcher that
//! maps alerts onto them. Every operation that resolves a tag holds that
//! tag's lock from resolution through submission.

mod cancel_orders;
mod close_positions;
mod create_order;
mod dispatch_alert;
mod update_stops;

pub use cancel_orders::CancelOrdersUseCase;
pub use close_positions::ClosePositionsUseCase;
pub use create_order::{CreateOrderCommand, CreateOrderUseCase};
pub use dispatch_alert::{AlertDispatcher, DispatcherSettings};
pub use update_stops::UpdateStopsUseCase;

/// Values stamped on every request the engine creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDefaults {
    /// Magic number identifying this engine's orders.
    pub magic: u64,
    /// Maximum slippage in points for market deals.
    pub deviation: u32,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            magic: 729_343,
            deviation: 20,
        }
    }
}
