use crate::book_index::{BookIndex, LevelInfo};
use crate::config::BookConfig;
use crate::error::{OrderBookError, OrderBookResult};
use crate::lookup::OrderLookup;
use crate::order::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
use crate::ticks::Tick;
use crate::trade::{Trade, Trades};

use rust_decimal::Decimal;
use tracing::{debug, error, info, trace};

/// A limit order book with price-time priority matching.
///
/// The book keeps two sides (bids and asks), each a set of price levels
/// ordered best-first, and a lookup from order id to the order's position so
/// cancels never scan.
///
/// # Price-Time Priority
/// - Price: matching always reads the current best bid and best ask from the
///   level maps, never a cached value.
/// - Time: each level is a FIFO queue. New orders join the tail and matching
///   takes from the head. A partially filled head stays at the head.
///
/// # Error Policy
/// Every mutating operation has a strict `try_*` form that reports why it
/// did nothing, and a soft form that turns those reasons into an empty
/// result. The soft forms only return `Err` for
/// [`OrderBookError::OverFill`], which means the matching itself is broken.
///
/// # Example
/// ```
/// # use rust_decimal_macros::dec;
/// # use matchbook::{Order, OrderBook, OrderType, Side};
/// let mut book = OrderBook::new(dec!(0.01)).unwrap();
///
/// // Resting bids at three prices
/// let bids = [(101, dec!(100.00), 10), (102, dec!(101.00), 5), (103, dec!(99.00), 7)];
/// for (id, price, qty) in bids {
///     let order = Order::new(OrderType::GoodTillCancel, id, Side::Buy, price, qty).unwrap();
///     assert!(book.add_order(order).unwrap().is_empty());
/// }
///
/// // A sell at 100.00 trades with the best bid first
/// let sell = Order::new(OrderType::GoodTillCancel, 201, Side::Sell, dec!(100.00), 3).unwrap();
/// let trades = book.add_order(sell).unwrap();
///
/// assert_eq!(trades.len(), 1);
/// assert_eq!(trades[0].bid().order_id, 102);
/// assert_eq!(trades[0].quantity(), 3);
/// assert_eq!(book.find_order(102).unwrap().remaining_quantity(), 2);
/// assert_eq!(book.len(), 3);
/// ```
#[derive(Debug)]
pub struct OrderBook {
    config: BookConfig,
    bids: BookIndex,
    asks: BookIndex,
    lookup: OrderLookup,
}

impl OrderBook {
    pub fn new(tick_size: Decimal) -> eyre::Result<Self> {
        Self::with_config(BookConfig::with_tick_size(tick_size))
    }

    pub fn with_config(config: BookConfig) -> eyre::Result<Self> {
        config.validate()?;
        info!(
            "Creating order book with tick size {} (side change on modify: {})",
            config.tick_size, config.allow_side_change
        );

        Ok(Self {
            config,
            bids: BookIndex::new(Side::Buy),
            asks: BookIndex::new(Side::Sell),
            lookup: OrderLookup::new(),
        })
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    fn book_side(&self, side: Side) -> &BookIndex {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn book_side_mut(&mut self, side: Side) -> &mut BookIndex {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Would an order on `side` at `price` trade against the current book?
    pub fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.asks.best_price().is_some_and(|ask| price >= ask),
            Side::Sell => self.bids.best_price().is_some_and(|bid| price <= bid),
        }
    }

    /// Add an order and match it.
    ///
    /// Declined orders (duplicate id, off-tick or non-positive price, a
    /// fill-and-kill that cannot cross) leave the book unchanged and produce
    /// no trades. See [`OrderBook::try_add_order`] for the reason.
    pub fn add_order(&mut self, order: Order) -> OrderBookResult<Trades> {
        absorb("add", self.try_add_order(order))
    }

    /// Add an order and match it, reporting why a declined order was declined.
    ///
    /// # Behavior
    /// 1. Rejects an id that is already resting.
    /// 2. Rejects a price that is non-positive or off the tick grid.
    /// 3. Rejects a fill-and-kill order that does not cross on arrival.
    /// 4. Appends the order to the tail of its level and registers it, unless
    ///    the side's resting quantity would overflow.
    /// 5. Matches the book until the best bid no longer crosses the best ask.
    /// 6. Discards whatever is left of a fill-and-kill order.
    pub fn try_add_order(&mut self, order: Order) -> OrderBookResult<Trades> {
        debug!("Adding order: {:?}", order);

        let order_id = order.id();
        let order_type = order.order_type();

        if self.lookup.contains(order_id) {
            return Err(OrderBookError::DuplicateOrderId(order_id));
        }

        let tick = Tick::new(order.price(), self.config.tick_size)?;

        if order_type == OrderType::FillAndKill && !self.can_match(order.side(), order.price()) {
            return Err(OrderBookError::FillAndKillUnmatched(order_id));
        }

        let locator = self.book_side_mut(order.side()).insert(order, tick)?;
        if let Err(err) = self.lookup.insert(order_id, locator) {
            self.book_side_mut(locator.side).remove_at(&locator)?;
            return Err(err);
        }

        let trades = self.match_orders()?;

        if order_type == OrderType::FillAndKill && self.lookup.contains(order_id) {
            let rest = self.try_cancel_order(order_id)?;
            debug!(
                "Discarded {} unfilled of fill-and-kill order {}",
                rest.remaining_quantity(),
                order_id
            );
        }

        Ok(trades)
    }

    /// Cross the best bid against the best ask until they no longer overlap.
    fn match_orders(&mut self) -> OrderBookResult<Trades> {
        let mut trades = Trades::new();

        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };

            if bid_price < ask_price {
                break;
            }

            let (Some(bid), Some(ask)) = (self.bids.front(), self.asks.front()) else {
                break;
            };
            let quantity = bid.remaining_quantity().min(ask.remaining_quantity());

            let bid_fill = self.bids.fill_front(quantity)?;
            let ask_fill = self.asks.fill_front(quantity)?;
            let (Some(bid_fill), Some(ask_fill)) = (bid_fill, ask_fill) else {
                break;
            };

            for completed in [&bid_fill.completed, &ask_fill.completed].into_iter().flatten() {
                self.lookup.remove(completed.id());
            }

            let trade = Trade::new(bid_fill.info, ask_fill.info);
            trace!(
                "Trade: bid {} @ {} / ask {} @ {} for {}",
                trade.bid().order_id,
                trade.bid().price,
                trade.ask().order_id,
                trade.ask().price,
                quantity
            );
            trades.push(trade);
        }

        Ok(trades)
    }

    /// Remove a resting order. Unknown ids are ignored.
    pub fn cancel_order(&mut self, order_id: OrderId) {
        if let Err(err) = self.try_cancel_order(order_id) {
            debug!("cancel ignored: {}", err);
        }
    }

    /// Remove a resting order and hand it back.
    pub fn try_cancel_order(&mut self, order_id: OrderId) -> OrderBookResult<Order> {
        debug!("Cancelling order: {}", order_id);

        let locator = *self
            .lookup
            .find(order_id)
            .ok_or(OrderBookError::UnknownOrderId(order_id))?;

        let removed = self.book_side_mut(locator.side).remove_at(&locator);
        // A stale entry is dropped either way
        self.lookup.remove(order_id);
        removed
    }

    /// Replace a resting order's price and quantity. Unknown ids and invalid
    /// requests are ignored.
    pub fn modify_order(&mut self, request: OrderModify) -> OrderBookResult<Trades> {
        absorb("modify", self.try_modify_order(request))
    }

    /// Cancel-and-replace under the same id and order type.
    ///
    /// The replacement is validated before the resting order is touched, so a
    /// rejected request leaves the book as it was. An accepted one joins the
    /// tail of its new level and loses its time priority, even when the price
    /// did not change.
    ///
    /// # Example
    /// ```
    /// # use rust_decimal_macros::dec;
    /// # use matchbook::{Order, OrderBook, OrderModify, OrderType, Side};
    /// let mut book = OrderBook::new(dec!(0.01)).unwrap();
    /// let order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, dec!(20.00), 10).unwrap();
    /// book.add_order(order).unwrap();
    ///
    /// book.try_modify_order(OrderModify::new(1, dec!(21.00), 12)).unwrap();
    ///
    /// let order = book.find_order(1).unwrap();
    /// assert_eq!(order.price(), dec!(21.00));
    /// assert_eq!(order.remaining_quantity(), 12);
    /// assert_eq!(book.best_bid(), Some(dec!(21.00)));
    /// ```
    pub fn try_modify_order(&mut self, request: OrderModify) -> OrderBookResult<Trades> {
        let order_id = request.order_id();
        debug!("Modifying order: {:?}", request);

        let locator = *self
            .lookup
            .find(order_id)
            .ok_or(OrderBookError::UnknownOrderId(order_id))?;
        let existing = self
            .book_side(locator.side)
            .get(&locator)
            .ok_or(OrderBookError::StaleLocator(order_id))?;
        let (order_type, resting_side) = (existing.order_type(), existing.side());

        if let Some(requested) = request.side() {
            if requested != resting_side && !self.config.allow_side_change {
                return Err(OrderBookError::SideMismatch {
                    order_id,
                    resting: resting_side,
                    requested,
                });
            }
        }

        let replacement = request.to_order(order_type, resting_side)?;
        Tick::new(replacement.price(), self.config.tick_size)?;

        self.try_cancel_order(order_id)?;
        self.try_add_order(replacement)
    }

    /// Drop every resting order.
    pub fn clear_all(&mut self) {
        info!("Clearing {} orders", self.lookup.len());
        self.bids.clear();
        self.asks.clear();
        self.lookup.clear();
    }

    /// Number of live orders.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn find_order(&self, order_id: OrderId) -> Option<&Order> {
        let locator = self.lookup.find(order_id)?;
        self.book_side(locator.side).get(locator)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Best ask minus best bid, once both sides quote.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Resting quantity at the best bid.
    pub fn best_bid_volume(&self) -> Option<Quantity> {
        self.bids.best_volume()
    }

    pub fn best_ask_volume(&self) -> Option<Quantity> {
        self.asks.best_volume()
    }

    /// Total resting quantity on one side.
    pub fn volume(&self, side: Side) -> Quantity {
        self.book_side(side).total_volume()
    }

    /// Levels on one side, best price first.
    pub fn depth(&self, side: Side) -> Vec<LevelInfo> {
        self.book_side(side).depth()
    }

    /// Orders resting at one price, oldest first. Empty for a price off the
    /// tick grid.
    pub fn orders_at(&self, side: Side, price: Price) -> Vec<&Order> {
        match Tick::new(price, self.config.tick_size) {
            Ok(tick) => self.book_side(side).orders_at(tick),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        let config = BookConfig::default();
        Self {
            config,
            bids: BookIndex::new(Side::Buy),
            asks: BookIndex::new(Side::Sell),
            lookup: OrderLookup::new(),
        }
    }
}

/// Turn recoverable errors into an empty result; let fatal ones through.
fn absorb<T: Default>(operation: &str, result: OrderBookResult<T>) -> OrderBookResult<T> {
    match result {
        Err(err) if err.is_fatal() => {
            error!("{} failed: {}", operation, err);
            Err(err)
        }
        Err(err) => {
            debug!("{} ignored: {}", operation, err);
            Ok(T::default())
        }
        ok => ok,
    }
}
