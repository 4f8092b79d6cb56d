use rust_decimal::Decimal;

use crate::error::{OrderBookError, OrderBookResult};
use crate::order::Price;

/// A price level key in the book.
///
/// Ticks represent the discrete price points orders can rest at. A price is
/// accepted only if it is positive and an exact multiple of the tick size, so
/// the key always equals the resting order's own price.
///
/// # Ordering
/// Ordered by price level, which lets a `BTreeMap<Tick, _>` answer best bid
/// (last key) and best ask (first key) directly.
///
/// # Example
/// ```
/// # use rust_decimal_macros::dec;
/// # use matchbook::Tick;
/// let tick = Tick::new(dec!(100.01), dec!(0.01)).unwrap();
/// assert_eq!(tick.level(), dec!(100.01));
///
/// // Between two ticks
/// assert!(Tick::new(dec!(100.012), dec!(0.01)).is_err());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tick {
    level: Decimal,
}

impl Tick {
    pub fn new(price: Price, tick_size: Decimal) -> OrderBookResult<Self> {
        if price <= Decimal::ZERO {
            return Err(OrderBookError::InvalidPrice(price));
        }

        if !Self::on_grid(price, tick_size) {
            return Err(OrderBookError::OffTickPrice { price, tick_size });
        }

        Ok(Self { level: price })
    }

    fn on_grid(price: Price, tick_size: Decimal) -> bool {
        (price % tick_size).is_zero()
    }

    pub fn level(&self) -> Decimal {
        self.level
    }
}
