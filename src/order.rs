use std::fmt;

use rust_decimal::Decimal;

use crate::error::{OrderBookError, OrderBookResult};

/// Caller-assigned order identifier. The book only requires that no two live
/// orders share one.
pub type OrderId = u64;

/// Limit price. Any positive decimal that lies on the book's tick grid.
pub type Price = Decimal;

/// Whole units of quantity.
pub type Quantity = u64;

/// How long an order is allowed to live in the book.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum OrderType {
    /// Rests until filled or cancelled.
    GoodTillCancel,
    /// Trades whatever crosses on arrival; the remainder is discarded.
    FillAndKill,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::GoodTillCancel => write!(f, "GTC"),
            OrderType::FillAndKill => write!(f, "FAK"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// An order resting in (or submitted to) the book.
///
/// # Fill Lifecycle
/// An order starts with `remaining_quantity == initial_quantity`. The only
/// mutation is [`Order::fill`], which moves `remaining_quantity` monotonically
/// towards zero. Once it reaches zero the book evicts the order.
///
/// # Example
/// ```
/// # use rust_decimal_macros::dec;
/// # use matchbook::{Order, OrderType, Side};
/// let mut order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, dec!(100.50), 10)
///     .expect("invalid order");
///
/// order.fill(3).expect("within remaining quantity");
/// assert_eq!(order.remaining_quantity(), 7);
/// assert_eq!(order.filled_quantity(), 3);
/// assert!(!order.is_filled());
///
/// // Filling past the remaining quantity is a defect, not a clamp
/// assert!(order.fill(8).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Order {
    id: OrderId,
    side: Side,
    order_type: OrderType,
    price: Price,
    initial_quantity: Quantity,
    remaining_quantity: Quantity,
}

impl Order {
    pub fn new(
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> OrderBookResult<Self> {
        if quantity == 0 {
            return Err(OrderBookError::InvalidQuantity);
        }

        Ok(Self {
            id,
            side,
            order_type,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn initial_quantity(&self) -> Quantity {
        self.initial_quantity
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.initial_quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Take `quantity` off the remaining size. The order is left untouched on
    /// error.
    pub fn fill(&mut self, quantity: Quantity) -> OrderBookResult<()> {
        if quantity > self.remaining_quantity {
            return Err(OrderBookError::OverFill {
                order_id: self.id,
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }

        self.remaining_quantity -= quantity;
        Ok(())
    }
}

/// A request to replace a resting order's price and quantity.
///
/// The replacement keeps the order id and type but goes to the back of its
/// price level.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OrderModify {
    order_id: OrderId,
    side: Option<Side>, // None keeps the resting order's side
    price: Price,
    quantity: Quantity,
}

impl OrderModify {
    pub fn new(order_id: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            side: None,
            price,
            quantity,
        }
    }

    pub fn with_side(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            side: Some(side),
            price,
            quantity,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Build the replacement order for a resting order of `order_type` on
    /// `resting_side`.
    pub fn to_order(&self, order_type: OrderType, resting_side: Side) -> OrderBookResult<Order> {
        Order::new(
            order_type,
            self.order_id,
            self.side.unwrap_or(resting_side),
            self.price,
            self.quantity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_order() {
        let order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, dec!(100.50), 10)
            .expect("invalid order");

        assert_eq!(order.id(), 1);
        assert_eq!(order.side(), Side::Buy);
        assert_eq!(order.order_type(), OrderType::GoodTillCancel);
        assert_eq!(order.price(), dec!(100.50));
        assert_eq!(order.initial_quantity(), 10);
        assert_eq!(order.remaining_quantity(), 10);
        assert_eq!(order.filled_quantity(), 0);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = Order::new(OrderType::FillAndKill, 1, Side::Sell, dec!(10), 0);
        assert_eq!(result, Err(OrderBookError::InvalidQuantity));
    }

    #[test]
    fn test_fill_to_completion() {
        let mut order = Order::new(OrderType::GoodTillCancel, 1, Side::Buy, dec!(100.50), 10)
            .expect("invalid order");

        order.fill(3).expect("partial fill");
        assert_eq!(order.remaining_quantity(), 7);
        assert_eq!(order.filled_quantity(), 3);

        order.fill(7).expect("final fill");
        assert_eq!(order.remaining_quantity(), 0);
        assert_eq!(order.filled_quantity(), 10);
        assert!(order.is_filled());
    }

    #[test]
    fn test_overfill_leaves_order_untouched() {
        let mut order = Order::new(OrderType::GoodTillCancel, 9, Side::Sell, dec!(20), 5)
            .expect("invalid order");

        let err = order.fill(6).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            OrderBookError::OverFill {
                order_id: 9,
                requested: 6,
                remaining: 5,
            }
        );
        assert_eq!(order.remaining_quantity(), 5);
    }

    #[test]
    fn test_modify_to_order() {
        let modify = OrderModify::new(100, dec!(99.99), 5);
        let order = modify
            .to_order(OrderType::FillAndKill, Side::Sell)
            .expect("invalid order");

        assert_eq!(order.id(), 100);
        assert_eq!(order.side(), Side::Sell); // inherited
        assert_eq!(order.order_type(), OrderType::FillAndKill);
        assert_eq!(order.price(), dec!(99.99));
        assert_eq!(order.remaining_quantity(), 5);

        let flipped = OrderModify::with_side(100, Side::Buy, dec!(99.99), 5)
            .to_order(OrderType::GoodTillCancel, Side::Sell)
            .expect("invalid order");
        assert_eq!(flipped.side(), Side::Buy);
    }

    #[test]
    fn test_display() {
        assert_eq!(Side::Buy.to_string(), "Buy");
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(OrderType::GoodTillCancel.to_string(), "GTC");
        assert_eq!(OrderType::FillAndKill.to_string(), "FAK");
    }
}
