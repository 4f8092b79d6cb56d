use std::fmt;

use crate::order::{OrderId, Price, Quantity};

/// One side of a trade: which order traded, at its own resting price, for how
/// much.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TradeInfo {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// A match between the head of the best bid level and the head of the best
/// ask level.
///
/// Both legs always carry the same quantity. The prices can differ when the
/// book was crossed: each leg reports the price its own order rested at.
///
/// # Example
/// ```
/// # use rust_decimal_macros::dec;
/// # use matchbook::{Order, OrderBook, OrderType, Side};
/// let mut book = OrderBook::new(dec!(0.01)).unwrap();
///
/// let bid = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, dec!(20.00), 10).unwrap();
/// let ask = Order::new(OrderType::GoodTillCancel, 2, Side::Sell, dec!(20.00), 10).unwrap();
///
/// book.add_order(bid).unwrap();
/// let trades = book.add_order(ask).unwrap();
///
/// let trade = &trades[0];
/// assert_eq!(trade.bid().order_id, 1);
/// assert_eq!(trade.ask().order_id, 2);
/// assert_eq!(trade.quantity(), 10);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Trade {
    bid: TradeInfo,
    ask: TradeInfo,
}

pub type Trades = Vec<Trade>;

impl Trade {
    pub fn new(bid: TradeInfo, ask: TradeInfo) -> Self {
        Self { bid, ask }
    }

    pub fn bid(&self) -> &TradeInfo {
        &self.bid
    }

    pub fn ask(&self) -> &TradeInfo {
        &self.ask
    }

    pub fn quantity(&self) -> Quantity {
        self.bid.quantity
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TRADE EXECUTED:")?;
        writeln!(
            f,
            "  Bid Order ID: {}, Price: {:.2}, Quantity: {}",
            self.bid.order_id, self.bid.price, self.bid.quantity
        )?;
        write!(
            f,
            "  Ask Order ID: {}, Price: {:.2}, Quantity: {}",
            self.ask.order_id, self.ask.price, self.ask.quantity
        )
    }
}
