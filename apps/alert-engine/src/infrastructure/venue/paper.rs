//! Paper venue.
//!
//! An in-process terminal with a pending-order book, a position book and
//! fixed quotes. Used for dry runs (`venue.kind: paper`) and as the venue
//! behind the application tests. Requests are applied the way a hedging
//! account applies them: market deals without a position ticket open a new
//! position, market deals with one close (part of) it.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::application::ports::{Quote, VenueError, VenuePort};
use crate::domain::instrument::SymbolInfo;
use crate::domain::shared::{Symbol, Ticket};
use crate::domain::trade::{
    OpenPosition, OrderRequest, OrderType, PendingOrder, PendingOrderType, RetCode,
    SubmissionStatus, SubmitResult, TradeAction, TradeSide,
};

const SEED_MAGIC: u64 = 729_343;
const FIRST_TICKET: u64 = 1_000;

/// A symbol listed on the paper venue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaperSymbol {
    /// Symbol name.
    pub name: Symbol,
    /// Whether the symbol is already in the watch list.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether selecting the symbol succeeds.
    #[serde(default = "default_true")]
    pub selectable: bool,
    /// Minimum price change.
    #[serde(default = "default_tick")]
    pub tick_size: Decimal,
    /// Account-currency value of one tick for one lot.
    #[serde(default = "default_tick_value")]
    pub tick_value: Decimal,
    /// Volume granularity.
    #[serde(default = "default_volume")]
    pub volume_step: Decimal,
    /// Smallest tradable volume.
    #[serde(default = "default_volume")]
    pub volume_min: Decimal,
    /// Price point.
    #[serde(default = "default_tick")]
    pub point: Decimal,
    /// Bid.
    pub bid: Decimal,
    /// Ask.
    pub ask: Decimal,
}

const fn default_true() -> bool {
    true
}

fn default_tick() -> Decimal {
    dec!(0.00001)
}

const fn default_tick_value() -> Decimal {
    Decimal::ONE
}

fn default_volume() -> Decimal {
    dec!(0.01)
}

impl PaperSymbol {
    /// A visible FX-style symbol (5-digit prices, 0.01 lot step) quoted at `bid`/`ask`.
    #[must_use]
    pub fn new(name: &str, bid: Decimal, ask: Decimal) -> Self {
        Self {
            name: Symbol::new(name),
            visible: true,
            selectable: true,
            tick_size: default_tick(),
            tick_value: default_tick_value(),
            volume_step: default_volume(),
            volume_min: default_volume(),
            point: default_tick(),
            bid,
            ask,
        }
    }

    fn info(&self) -> SymbolInfo {
        SymbolInfo {
            name: self.name.clone(),
            visible: self.visible,
            tick_size: self.tick_size,
            tick_value: self.tick_value,
            volume_step: self.volume_step,
            volume_min: self.volume_min,
            point: self.point,
        }
    }
}

#[derive(Debug)]
struct Book {
    equity: Decimal,
    symbols: HashMap<Symbol, PaperSymbol>,
    pending: Vec<PendingOrder>,
    positions: Vec<OpenPosition>,
    next_ticket: u64,
    journal: Vec<OrderRequest>,
    scripted: VecDeque<Option<RetCode>>,
    selections: usize,
    listings: usize,
    connected: bool,
}

impl Book {
    fn ticket(&mut self) -> Ticket {
        let ticket = Ticket::new(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    fn apply(&mut self, request: &OrderRequest) -> SubmitResult {
        match request.action {
            TradeAction::Deal => match request.position {
                Some(position) => self.close(position, request),
                None => self.open(request),
            },
            TradeAction::Pending => self.place(request),
            TradeAction::Modify => self.modify_order(request),
            TradeAction::SlTp => self.modify_position(request),
            TradeAction::Remove => self.remove(request),
        }
    }

    fn entry_fields(
        &self,
        request: &OrderRequest,
    ) -> Result<(Symbol, Decimal, OrderType), SubmitResult> {
        let invalid = |comment: &str| SubmitResult {
            comment: Some(comment.to_string()),
            ..SubmitResult::new(RetCode::INVALID, None)
        };
        let symbol = request
            .symbol
            .clone()
            .filter(|s| self.symbols.contains_key(s))
            .ok_or_else(|| invalid("unknown symbol"))?;
        let order_type = request.order_type.ok_or_else(|| invalid("missing order type"))?;
        let volume = request.volume.unwrap_or_default();
        if volume <= Decimal::ZERO {
            return Err(SubmitResult {
                comment: Some("invalid volume".to_string()),
                ..SubmitResult::new(RetCode::INVALID_VOLUME, None)
            });
        }
        Ok((symbol, volume, order_type))
    }

    fn open(&mut self, request: &OrderRequest) -> SubmitResult {
        let (symbol, volume, order_type) = match self.entry_fields(request) {
            Ok(fields) => fields,
            Err(result) => return result,
        };
        let side = order_type.side();
        let price = match request.price {
            Some(price) => price,
            None => self.symbols.get(&symbol).map_or(Decimal::ZERO, |s| match side {
                TradeSide::Long => s.ask,
                TradeSide::Short => s.bid,
            }),
        };
        let ticket = self.ticket();
        self.positions.push(OpenPosition {
            ticket,
            symbol,
            side,
            volume,
            price_open: price,
            sl: request.sl,
            tp: request.tp,
            magic: request.magic,
            comment: request.comment.clone(),
        });
        SubmitResult::new(RetCode::DONE, Some(ticket))
    }

    fn close(&mut self, position: Ticket, request: &OrderRequest) -> SubmitResult {
        let Some(index) = self.positions.iter().position(|p| p.ticket == position) else {
            return SubmitResult::new(RetCode::POSITION_CLOSED, None);
        };
        let volume = request.volume.unwrap_or_default();
        let held = self.positions[index].volume;
        if volume <= Decimal::ZERO || volume > held {
            return SubmitResult::new(RetCode::INVALID_VOLUME, None);
        }
        if volume == held {
            self.positions.remove(index);
        } else {
            self.positions[index].volume = held - volume;
        }
        let deal = self.ticket();
        SubmitResult::new(RetCode::DONE, Some(deal))
    }

    fn place(&mut self, request: &OrderRequest) -> SubmitResult {
        let (symbol, volume, order_type) = match self.entry_fields(request) {
            Ok(fields) => fields,
            Err(result) => return result,
        };
        let pending_type = match order_type {
            OrderType::BuyLimit => PendingOrderType::BuyLimit,
            OrderType::SellLimit => PendingOrderType::SellLimit,
            OrderType::Buy | OrderType::Sell => {
                return SubmitResult::new(RetCode::INVALID, None);
            }
        };
        let Some(price) = request.price else {
            return SubmitResult::new(RetCode::INVALID, None);
        };
        let ticket = self.ticket();
        self.pending.push(PendingOrder {
            ticket,
            symbol,
            order_type: pending_type,
            volume,
            price_open: price,
            sl: request.sl,
            tp: request.tp,
            magic: request.magic,
            comment: request.comment.clone(),
        });
        SubmitResult::new(RetCode::DONE, Some(ticket))
    }

    fn modify_order(&mut self, request: &OrderRequest) -> SubmitResult {
        let Some(order) = self
            .pending
            .iter_mut()
            .find(|o| Some(o.ticket) == request.order)
        else {
            return SubmitResult::new(RetCode::INVALID, None);
        };
        if let Some(price) = request.price {
            order.price_open = price;
        }
        order.sl = request.sl;
        order.tp = request.tp;
        SubmitResult::new(RetCode::DONE, Some(order.ticket))
    }

    fn modify_position(&mut self, request: &OrderRequest) -> SubmitResult {
        let Some(position) = self
            .positions
            .iter_mut()
            .find(|p| Some(p.ticket) == request.position)
        else {
            return SubmitResult::new(RetCode::POSITION_CLOSED, None);
        };
        position.sl = request.sl;
        position.tp = request.tp;
        SubmitResult::new(RetCode::DONE, Some(position.ticket))
    }

    fn remove(&mut self, request: &OrderRequest) -> SubmitResult {
        let Some(index) = self
            .pending
            .iter()
            .position(|o| Some(o.ticket) == request.order)
        else {
            return SubmitResult::new(RetCode::INVALID, None);
        };
        let order = self.pending.remove(index);
        SubmitResult::new(RetCode::DONE, Some(order.ticket))
    }
}

/// In-process terminal.
#[derive(Debug)]
pub struct PaperVenue {
    book: Mutex<Book>,
    latency: Mutex<Duration>,
}

impl PaperVenue {
    /// Empty venue with the given account equity.
    #[must_use]
    pub fn new(equity: Decimal) -> Self {
        Self {
            book: Mutex::new(Book {
                equity,
                symbols: HashMap::new(),
                pending: Vec::new(),
                positions: Vec::new(),
                next_ticket: FIRST_TICKET,
                journal: Vec::new(),
                scripted: VecDeque::new(),
                selections: 0,
                listings: 0,
                connected: false,
            }),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    /// List a symbol.
    #[must_use]
    pub fn with_symbol(self, symbol: PaperSymbol) -> Self {
        self.book.lock().symbols.insert(symbol.name.clone(), symbol);
        self
    }

    /// List several symbols.
    #[must_use]
    pub fn with_symbols(self, symbols: impl IntoIterator<Item = PaperSymbol>) -> Self {
        symbols.into_iter().fold(self, Self::with_symbol)
    }

    /// Move the quote of a listed symbol.
    pub fn set_quote(&self, symbol: &str, bid: Decimal, ask: Decimal) {
        if let Some(listed) = self.book.lock().symbols.get_mut(&Symbol::new(symbol)) {
            listed.bid = bid;
            listed.ask = ask;
        }
    }

    /// Change the account equity.
    pub fn set_equity(&self, equity: Decimal) {
        self.book.lock().equity = equity;
    }

    /// Delay every venue call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Script the answer to the next submission.
    ///
    /// `Some(code)` answers with that code; only success codes apply the
    /// request. `None` answers with no result at all.
    pub fn respond_next(&self, answer: Option<RetCode>) {
        self.book.lock().scripted.push_back(answer);
    }

    /// Seed a resting limit order.
    pub fn place_pending(
        &self,
        symbol: &str,
        side: TradeSide,
        volume: Decimal,
        price: Decimal,
        comment: &str,
    ) -> Ticket {
        let order_type = match side {
            TradeSide::Long => PendingOrderType::BuyLimit,
            TradeSide::Short => PendingOrderType::SellLimit,
        };
        self.place_pending_typed(symbol, order_type, volume, price, comment)
    }

    /// Seed a resting order of any pending type.
    pub fn place_pending_typed(
        &self,
        symbol: &str,
        order_type: PendingOrderType,
        volume: Decimal,
        price: Decimal,
        comment: &str,
    ) -> Ticket {
        let mut book = self.book.lock();
        let ticket = book.ticket();
        book.pending.push(PendingOrder {
            ticket,
            symbol: Symbol::new(symbol),
            order_type,
            volume,
            price_open: price,
            sl: None,
            tp: None,
            magic: SEED_MAGIC,
            comment: comment.to_string(),
        });
        ticket
    }

    /// Seed an open position.
    pub fn open_position(
        &self,
        symbol: &str,
        side: TradeSide,
        volume: Decimal,
        price: Decimal,
        comment: &str,
    ) -> Ticket {
        let mut book = self.book.lock();
        let ticket = book.ticket();
        book.positions.push(OpenPosition {
            ticket,
            symbol: Symbol::new(symbol),
            side,
            volume,
            price_open: price,
            sl: None,
            tp: None,
            magic: SEED_MAGIC,
            comment: comment.to_string(),
        });
        ticket
    }

    /// Set the stop and target of a seeded position.
    pub fn set_position_stops(&self, ticket: Ticket, sl: Option<Decimal>, tp: Option<Decimal>) {
        if let Some(position) = self
            .book
            .lock()
            .positions
            .iter_mut()
            .find(|p| p.ticket == ticket)
        {
            position.sl = sl;
            position.tp = tp;
        }
    }

    /// Fill a pending order at its price. The position keeps the order's
    /// ticket, comment and magic.
    pub fn fill_pending(&self, ticket: Ticket) -> Option<Ticket> {
        let mut book = self.book.lock();
        let index = book.pending.iter().position(|o| o.ticket == ticket)?;
        let order = book.pending.remove(index);
        book.positions.push(OpenPosition {
            ticket: order.ticket,
            symbol: order.symbol,
            side: order.order_type.side(),
            volume: order.volume,
            price_open: order.price_open,
            sl: order.sl,
            tp: order.tp,
            magic: order.magic,
            comment: order.comment,
        });
        Some(ticket)
    }

    /// Every request submitted so far, in order.
    #[must_use]
    pub fn journal(&self) -> Vec<OrderRequest> {
        self.book.lock().journal.clone()
    }

    /// Current pending-order book.
    #[must_use]
    pub fn pending_snapshot(&self) -> Vec<PendingOrder> {
        self.book.lock().pending.clone()
    }

    /// Current position book.
    #[must_use]
    pub fn positions_snapshot(&self) -> Vec<OpenPosition> {
        self.book.lock().positions.clone()
    }

    /// Number of symbol selections performed.
    #[must_use]
    pub fn selections(&self) -> usize {
        self.book.lock().selections
    }

    /// Number of pending-order or position listings served.
    #[must_use]
    pub fn listings(&self) -> usize {
        self.book.lock().listings
    }

    /// Whether a session is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.book.lock().connected
    }

    async fn delay(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl VenuePort for PaperVenue {
    async fn initialize(&self) -> Result<(), VenueError> {
        self.delay().await;
        self.book.lock().connected = true;
        tracing::info!("Paper venue session opened");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), VenueError> {
        self.delay().await;
        self.book.lock().connected = false;
        tracing::info!("Paper venue session closed");
        Ok(())
    }

    async fn symbol_info(&self, symbol: &Symbol) -> Result<Option<SymbolInfo>, VenueError> {
        self.delay().await;
        Ok(self.book.lock().symbols.get(symbol).map(PaperSymbol::info))
    }

    async fn select_symbol(&self, symbol: &Symbol) -> Result<bool, VenueError> {
        self.delay().await;
        let mut book = self.book.lock();
        book.selections += 1;
        Ok(match book.symbols.get_mut(symbol) {
            Some(listed) if listed.selectable => {
                listed.visible = true;
                true
            }
            _ => false,
        })
    }

    async fn account_equity(&self) -> Result<Decimal, VenueError> {
        self.delay().await;
        Ok(self.book.lock().equity)
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote, VenueError> {
        self.delay().await;
        self.book
            .lock()
            .symbols
            .get(symbol)
            .map(|listed| Quote {
                symbol: listed.name.clone(),
                bid: listed.bid,
                ask: listed.ask,
            })
            .ok_or_else(|| VenueError::Protocol {
                message: format!("no quote for {symbol}"),
            })
    }

    async fn submit_order(
        &self,
        request: &OrderRequest,
    ) -> Result<Option<SubmitResult>, VenueError> {
        self.delay().await;
        let mut book = self.book.lock();
        book.journal.push(request.clone());

        let result = match book.scripted.pop_front() {
            None => book.apply(request),
            Some(None) => return Ok(None),
            Some(Some(code)) => {
                let scripted = SubmitResult::new(code, None);
                if SubmissionStatus::classify(Some(&scripted)) == SubmissionStatus::Success {
                    SubmitResult {
                        retcode: code,
                        ..book.apply(request)
                    }
                } else {
                    SubmitResult {
                        comment: Some("scripted answer".to_string()),
                        ..scripted
                    }
                }
            }
        };
        tracing::debug!(
            action = request.action.as_str(),
            comment = %request.comment,
            retcode = %result.retcode,
            "Paper venue applied request"
        );
        Ok(Some(result))
    }

    async fn pending_orders(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<PendingOrder>, VenueError> {
        self.delay().await;
        let mut book = self.book.lock();
        book.listings += 1;
        Ok(book
            .pending
            .iter()
            .filter(|o| symbol.is_none_or(|s| &o.symbol == s))
            .cloned()
            .collect())
    }

    async fn open_positions(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<OpenPosition>, VenueError> {
        self.delay().await;
        let mut book = self.book.lock();
        book.listings += 1;
        Ok(book
            .positions
            .iter()
            .filter(|p| symbol.is_none_or(|s| &p.symbol == s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::{EntryParams, TradeRecord};

    fn venue() -> PaperVenue {
        PaperVenue::new(dec!(5000)).with_symbol(PaperSymbol::new("EURUSD", dec!(1.1), dec!(1.1002)))
    }

    fn entry(volume: Decimal) -> EntryParams {
        EntryParams {
            symbol: Symbol::new("EURUSD"),
            side: TradeSide::Long,
            volume,
            price: dec!(1.1002),
            sl: Some(dec!(1.09)),
            tp: None,
            comment: "eu".to_string(),
        }
    }

    #[tokio::test]
    async fn market_deal_opens_then_partially_closes() {
        let venue = venue();
        let opened = venue
            .submit_order(&OrderRequest::market(entry(dec!(0.3)), 1, 20))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(opened.retcode, RetCode::DONE);

        let position = venue.positions_snapshot().remove(0);
        assert_eq!(Some(position.ticket), opened.ticket);
        assert_eq!(position.sl, Some(dec!(1.09)));

        venue
            .submit_order(&OrderRequest::close(&position, dec!(0.1), dec!(1.1), 20, "eu"))
            .await
            .unwrap();
        assert_eq!(venue.positions_snapshot()[0].volume, dec!(0.2));

        venue
            .submit_order(&OrderRequest::close(&position, dec!(0.2), dec!(1.1), 20, "eu"))
            .await
            .unwrap();
        assert!(venue.positions_snapshot().is_empty());
    }

    #[tokio::test]
    async fn closing_more_than_held_is_rejected() {
        let venue = venue();
        venue.open_position("EURUSD", TradeSide::Short, dec!(0.1), dec!(1.1), "x");
        let position = venue.positions_snapshot().remove(0);

        let result = venue
            .submit_order(&OrderRequest::close(&position, dec!(0.5), dec!(1.1), 20, "x"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.retcode, RetCode::INVALID_VOLUME);
        assert_eq!(venue.positions_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn pending_order_lifecycle() {
        let venue = venue();
        venue
            .submit_order(&OrderRequest::pending(entry(dec!(0.1)), 1, 20))
            .await
            .unwrap();
        let record: TradeRecord = venue.pending_snapshot().remove(0).into();

        venue
            .submit_order(&OrderRequest::modify_pending(&record, Some(dec!(1.08)), Some(dec!(1.2))))
            .await
            .unwrap();
        let order = venue.pending_snapshot().remove(0);
        assert_eq!(order.sl, Some(dec!(1.08)));
        assert_eq!(order.tp, Some(dec!(1.2)));
        assert_eq!(order.order_type, PendingOrderType::BuyLimit);

        venue
            .submit_order(&OrderRequest::remove(&record, "Cancel order"))
            .await
            .unwrap();
        assert!(venue.pending_snapshot().is_empty());
    }

    #[tokio::test]
    async fn unknown_symbol_is_invalid() {
        let venue = venue();
        let request = OrderRequest::market(
            EntryParams {
                symbol: Symbol::new("NOPE"),
                ..entry(dec!(0.1))
            },
            1,
            20,
        );

        let result = venue.submit_order(&request).await.unwrap().unwrap();

        assert_eq!(result.retcode, RetCode::INVALID);
        assert_eq!(venue.journal().len(), 1);
    }

    #[tokio::test]
    async fn scripted_answers_are_consumed_in_order() {
        let venue = venue();
        venue.respond_next(None);
        venue.respond_next(Some(RetCode::NO_MONEY));

        let request = OrderRequest::market(entry(dec!(0.1)), 1, 20);
        assert_eq!(venue.submit_order(&request).await.unwrap(), None);
        let rejected = venue.submit_order(&request).await.unwrap().unwrap();
        assert_eq!(rejected.retcode, RetCode::NO_MONEY);
        assert!(venue.positions_snapshot().is_empty());

        let done = venue.submit_order(&request).await.unwrap().unwrap();
        assert_eq!(done.retcode, RetCode::DONE);
        assert_eq!(venue.positions_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn listings_filter_by_symbol_and_keep_order() {
        let venue = venue();
        let first = venue.place_pending("EURUSD", TradeSide::Long, dec!(0.1), dec!(1.0), "a");
        venue.place_pending("GBPUSD", TradeSide::Short, dec!(0.1), dec!(1.3), "b");
        let third = venue.place_pending("EURUSD", TradeSide::Short, dec!(0.1), dec!(1.2), "c");

        let listed = venue
            .pending_orders(Some(&Symbol::new("EURUSD")))
            .await
            .unwrap();

        assert_eq!(
            listed.iter().map(|o| o.ticket).collect::<Vec<_>>(),
            vec![first, third]
        );
        assert_eq!(venue.pending_orders(None).await.unwrap().len(), 3);
        assert_eq!(venue.listings(), 2);
    }

    #[tokio::test]
    async fn fill_pending_moves_order_to_positions() {
        let venue = venue();
        let ticket = venue.place_pending("EURUSD", TradeSide::Short, dec!(0.2), dec!(1.12), "f");

        assert_eq!(venue.fill_pending(ticket), Some(ticket));

        assert!(venue.pending_snapshot().is_empty());
        let position = venue.positions_snapshot().remove(0);
        assert_eq!(position.side, TradeSide::Short);
        assert_eq!(position.comment, "f");
        assert_eq!(position.price_open, dec!(1.12));
    }

    #[tokio::test]
    async fn unselectable_symbol_stays_hidden() {
        let venue = PaperVenue::new(dec!(1)).with_symbol(PaperSymbol {
            visible: false,
            selectable: false,
            ..PaperSymbol::new("XAUUSD", dec!(2600), dec!(2600.5))
        });
        let symbol = Symbol::new("XAUUSD");

        assert!(!venue.select_symbol(&symbol).await.unwrap());
        assert!(!venue.symbol_info(&symbol).await.unwrap().unwrap().visible);
    }

    #[test]
    fn paper_symbol_fills_defaults_from_config() {
        let symbol: PaperSymbol =
            serde_yaml_bw::from_str("name: EURUSD\nbid: 1.1\nask: 1.1002\n").unwrap();

        assert_eq!(symbol, PaperSymbol::new("EURUSD", dec!(1.1), dec!(1.1002)));
    }
}
