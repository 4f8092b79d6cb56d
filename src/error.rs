use rust_decimal::Decimal;
use thiserror::Error;

use crate::order::{OrderId, Quantity, Side};

/// Everything that can go wrong inside the book.
///
/// Only [`OrderBookError::OverFill`] signals a broken invariant. All other
/// variants describe caller input the book declined to act on, and the soft
/// operations on [`crate::OrderBook`] turn them into empty results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderBookError {
    #[error("order {order_id} cannot be filled by {requested}, only {remaining} remaining")]
    OverFill {
        order_id: OrderId,
        requested: Quantity,
        remaining: Quantity,
    },

    #[error("order {0} already exists")]
    DuplicateOrderId(OrderId),

    #[error("order {0} not found")]
    UnknownOrderId(OrderId),

    #[error("locator for order {0} no longer points at a resting order")]
    StaleLocator(OrderId),

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("price {price} is not a multiple of tick size {tick_size}")]
    OffTickPrice { price: Decimal, tick_size: Decimal },

    #[error("order {order_id} rests on the {resting} side, modify requested {requested}")]
    SideMismatch {
        order_id: OrderId,
        resting: Side,
        requested: Side,
    },

    #[error("order {order_id} for {quantity} would overflow the resting volume")]
    VolumeOverflow {
        order_id: OrderId,
        quantity: Quantity,
    },

    #[error("fill-and-kill order {0} would not match, discarding")]
    FillAndKillUnmatched(OrderId),
}

impl OrderBookError {
    /// True when the error means the matching algorithm itself is wrong.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OrderBookError::OverFill { .. })
    }
}

pub type OrderBookResult<T> = Result<T, OrderBookError>;
