use std::collections::HashMap;

use crate::book_index::Locator;
use crate::error::{OrderBookError, OrderBookResult};
use crate::order::OrderId;

/// Order id to locator table. An id is present exactly while its order rests
/// in the book.
#[derive(Debug, Default)]
pub struct OrderLookup {
    entries: HashMap<OrderId, Locator>,
}

impl OrderLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order_id: OrderId, locator: Locator) -> OrderBookResult<()> {
        if self.entries.contains_key(&order_id) {
            return Err(OrderBookError::DuplicateOrderId(order_id));
        }

        self.entries.insert(order_id, locator);
        Ok(())
    }

    pub fn remove(&mut self, order_id: OrderId) -> Option<Locator> {
        self.entries.remove(&order_id)
    }

    pub fn find(&self, order_id: OrderId) -> Option<&Locator> {
        self.entries.get(&order_id)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.entries.contains_key(&order_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
