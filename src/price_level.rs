use slab::Slab;

use crate::error::{OrderBookError, OrderBookResult};
use crate::order::{Order, Quantity};

/// Stable handle of an order inside a side's arena.
pub type Handle = usize;

/// Arena slot: the order plus its links inside its price level.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) order: Order,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// FIFO queue of the orders resting at one price on one side.
///
/// The queue is an intrusive doubly-linked list threaded through the side's
/// arena, so an order can be unlinked by handle in O(1) without disturbing
/// the handles of its neighbours.
#[derive(Debug, Default)]
pub struct PriceLevel {
    head: Option<Handle>,
    tail: Option<Handle>,
    order_count: usize,
    total_quantity: Quantity, // sum of remaining quantities
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail (lowest time priority). Declined, with nothing
    /// changed, if the level's total would no longer fit in a [`Quantity`].
    pub(crate) fn push_back(
        &mut self,
        arena: &mut Slab<Node>,
        order: Order,
    ) -> OrderBookResult<Handle> {
        let quantity = order.remaining_quantity();
        self.total_quantity = self.total_quantity.checked_add(quantity).ok_or(
            OrderBookError::VolumeOverflow {
                order_id: order.id(),
                quantity,
            },
        )?;
        self.order_count += 1;

        let handle = arena.insert(Node {
            order,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => arena[tail].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);

        Ok(handle)
    }

    /// Unlink `handle` from this level and release its arena slot. The caller
    /// guarantees `handle` belongs to this level.
    pub(crate) fn unlink(&mut self, arena: &mut Slab<Node>, handle: Handle) -> Order {
        let node = arena.remove(handle);

        match node.prev {
            Some(prev) => arena[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => arena[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        self.order_count -= 1;
        self.total_quantity -= node.order.remaining_quantity();
        node.order
    }

    /// Record that the order at the head lost `quantity` to a fill.
    pub(crate) fn reduce(&mut self, quantity: Quantity) {
        self.total_quantity -= quantity;
    }

    pub fn front(&self) -> Option<Handle> {
        self.head
    }

    pub(crate) fn iter<'a>(&self, arena: &'a Slab<Node>) -> LevelIter<'a> {
        LevelIter {
            arena,
            cursor: self.head,
        }
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}

/// Walks a level head to tail.
pub(crate) struct LevelIter<'a> {
    arena: &'a Slab<Node>,
    cursor: Option<Handle>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.arena[self.cursor?];
        self.cursor = node.next;
        Some(&node.order)
    }
}
