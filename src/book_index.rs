use std::collections::BTreeMap;

use slab::Slab;

use crate::error::{OrderBookError, OrderBookResult};
use crate::order::{Order, OrderId, Price, Quantity, Side};
use crate::price_level::{Handle, Node, PriceLevel};
use crate::ticks::Tick;
use crate::trade::TradeInfo;

/// Where a resting order lives: enough to unlink it without scanning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Locator {
    pub order_id: OrderId,
    pub side: Side,
    pub tick: Tick,
    pub handle: Handle,
}

/// Aggregated view of one price level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}

/// The outcome of filling the head of the best level.
#[derive(Debug)]
pub(crate) struct FrontFill {
    pub(crate) info: TradeInfo,
    /// The head order, if the fill completed it. It has already left the book.
    pub(crate) completed: Option<Order>,
}

/// One side of the book.
///
/// Levels are kept in a `BTreeMap` keyed by [`Tick`]. Bids read best-first
/// from the back of the map, asks from the front. The orders themselves live
/// in this side's arena; levels only hold handles into it.
#[derive(Debug)]
pub struct BookIndex {
    side: Side,
    levels: BTreeMap<Tick, PriceLevel>,
    orders: Slab<Node>,
    total_volume: Quantity,
}

impl BookIndex {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            orders: Slab::new(),
            total_volume: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    fn best_level(&self) -> Option<(&Tick, &PriceLevel)> {
        match self.side {
            Side::Buy => self.levels.last_key_value(),
            Side::Sell => self.levels.first_key_value(),
        }
    }

    fn best_tick(&self) -> Option<Tick> {
        self.best_level().map(|(tick, _)| *tick)
    }

    /// Highest bid or lowest ask.
    pub fn best_price(&self) -> Option<Price> {
        self.best_tick().map(|tick| tick.level())
    }

    /// Resting quantity at the best price.
    pub fn best_volume(&self) -> Option<Quantity> {
        self.best_level().map(|(_, level)| level.total_quantity())
    }

    /// Append `order` to the tail of the level at `tick`, creating the level
    /// if needed.
    ///
    /// Fails with [`OrderBookError::VolumeOverflow`] when the side's resting
    /// quantity would no longer fit in a [`Quantity`]; the side is untouched.
    pub fn insert(&mut self, order: Order, tick: Tick) -> OrderBookResult<Locator> {
        debug_assert_eq!(order.side(), self.side);
        debug_assert_eq!(order.price(), tick.level());

        let order_id = order.id();
        let quantity = order.remaining_quantity();
        let total_volume = self
            .total_volume
            .checked_add(quantity)
            .ok_or(OrderBookError::VolumeOverflow { order_id, quantity })?;

        let level = self.levels.entry(tick).or_default();
        let handle = match level.push_back(&mut self.orders, order) {
            Ok(handle) => handle,
            Err(err) => {
                if level.is_empty() {
                    self.levels.remove(&tick);
                }
                return Err(err);
            }
        };
        self.total_volume = total_volume;

        Ok(Locator {
            order_id,
            side: self.side,
            tick,
            handle,
        })
    }

    fn check(&self, locator: &Locator) -> OrderBookResult<()> {
        let live = locator.side == self.side
            && self.levels.contains_key(&locator.tick)
            && self.orders.get(locator.handle).is_some_and(|node| {
                node.order.id() == locator.order_id && node.order.price() == locator.tick.level()
            });

        if live {
            Ok(())
        } else {
            Err(OrderBookError::StaleLocator(locator.order_id))
        }
    }

    /// The order a locator points at, if it is still resting here.
    pub fn get(&self, locator: &Locator) -> Option<&Order> {
        self.check(locator).ok()?;
        self.orders.get(locator.handle).map(|node| &node.order)
    }

    /// Remove one order, pruning its level if it was the last one there.
    pub fn remove_at(&mut self, locator: &Locator) -> OrderBookResult<Order> {
        self.check(locator)?;

        let level = self
            .levels
            .get_mut(&locator.tick)
            .ok_or(OrderBookError::StaleLocator(locator.order_id))?;

        let order = level.unlink(&mut self.orders, locator.handle);
        if level.is_empty() {
            self.levels.remove(&locator.tick);
        }

        self.total_volume -= order.remaining_quantity();
        Ok(order)
    }

    /// The oldest order at the best price.
    pub fn front(&self) -> Option<&Order> {
        let (_, level) = self.best_level()?;
        let handle = level.front()?;
        self.orders.get(handle).map(|node| &node.order)
    }

    /// Fill the oldest order at the best price by `quantity`.
    ///
    /// A completed order is unlinked and returned in the same call, and an
    /// emptied level is removed with it. On error nothing has changed.
    pub(crate) fn fill_front(&mut self, quantity: Quantity) -> OrderBookResult<Option<FrontFill>> {
        let Some(tick) = self.best_tick() else {
            return Ok(None);
        };
        let Some(level) = self.levels.get_mut(&tick) else {
            return Ok(None);
        };
        let Some(handle) = level.front() else {
            return Ok(None);
        };

        let order = &mut self.orders[handle].order;
        order.fill(quantity)?;

        let info = TradeInfo {
            order_id: order.id(),
            price: order.price(),
            quantity,
        };
        let filled = order.is_filled();

        level.reduce(quantity);
        self.total_volume -= quantity;

        let completed = if filled {
            let order = level.unlink(&mut self.orders, handle);
            if level.is_empty() {
                self.levels.remove(&tick);
            }
            Some(order)
        } else {
            None
        };

        Ok(Some(FrontFill { info, completed }))
    }

    /// Orders resting at `tick`, oldest first.
    pub fn orders_at(&self, tick: Tick) -> Vec<&Order> {
        self.levels
            .get(&tick)
            .map(|level| level.iter(&self.orders).collect())
            .unwrap_or_default()
    }

    /// Every level, best price first.
    pub fn depth(&self) -> Vec<LevelInfo> {
        let info = |(tick, level): (&Tick, &PriceLevel)| LevelInfo {
            price: tick.level(),
            quantity: level.total_quantity(),
            order_count: level.order_count(),
        };

        match self.side {
            Side::Buy => self.levels.iter().rev().map(info).collect(),
            Side::Sell => self.levels.iter().map(info).collect(),
        }
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn total_volume(&self) -> Quantity {
        self.total_volume
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.orders.clear();
        self.total_volume = 0;
    }
}
