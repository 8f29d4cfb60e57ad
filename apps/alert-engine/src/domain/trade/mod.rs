//! Trade Context
//!
//! Records read back from the venue (pending orders and open positions),
//! the requests sent to it, and the classification of its answers.

mod order_request;
mod outcome;
mod record;
mod side;

pub use order_request::{EntryParams, FillPolicy, OrderRequest, OrderType, TimePolicy, TradeAction};
pub use outcome::{RetCode, SubmissionStatus, SubmitResult};
pub use record::{OpenPosition, PendingOrder, PendingOrderType, RecordKind, TradeRecord};
pub use side::TradeSide;
