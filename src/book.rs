//! Per-pair order book (C5): two price-ordered limit sides plus FIFO
//! staging queues for market orders. Directly grounded in
//! `matching_engine/src/lib.rs`'s `OrderBook` (`BTreeMap` of `PriceLevel`,
//! each a `VecDeque<Order>` FIFO bucket), generalized so a price level's
//! aggregate quantity is base-equivalent regardless of whether the
//! resting orders at that level were placed with `base_amount` or
//! `quote_amount`, and extended with persistent market-order queues —
//! the teacher drops an unfilled market order on the floor, but
//! `tmo/trading_pair.py`'s `market_buy_orders`/`market_sell_orders` keep
//! them around to be drained by a later `place_order` call, which is the
//! behavior this spec requires.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::order::{Order, OrderId, OrderKind, OrderSide};

#[derive(Debug, Clone)]
pub(crate) struct PriceLevel {
    pub(crate) price: Decimal,
    pub(crate) orders: VecDeque<Order>,
    pub(crate) total_quantity: Decimal,
}

impl PriceLevel {
    fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Decimal::ZERO,
        }
    }

    fn push_back(&mut self, order: Order) {
        self.total_quantity += order.remaining_base_equivalent(self.price);
        self.orders.push_back(order);
    }

    fn push_front(&mut self, order: Order) {
        self.total_quantity += order.remaining_base_equivalent(self.price);
        self.orders.push_front(order);
    }

    fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Location {
    Limit { side: OrderSide, price: Decimal },
    Market { side: OrderSide },
}

/// Read-only view of the book for external consumers: per-level
/// aggregate (price, remaining base-equivalent quantity), bids sorted
/// descending, asks ascending — the book's own canonical order (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookSnapshot {
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

pub(crate) struct OrderBook {
    bids: BTreeMap<Decimal, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
    market_buy_queue: VecDeque<Order>,
    market_sell_queue: VecDeque<Order>,
    locations: HashMap<OrderId, Location>,
    current_price: Decimal,
    last_update: DateTime<Utc>,
}

impl OrderBook {
    pub(crate) fn new(initial_price: Decimal) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            market_buy_queue: VecDeque::new(),
            market_sell_queue: VecDeque::new(),
            locations: HashMap::new(),
            current_price: initial_price,
            last_update: Utc::now(),
        }
    }

    pub(crate) fn current_price(&self) -> Decimal {
        self.current_price
    }

    pub(crate) fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub(crate) fn record_trade_price(&mut self, price: Decimal) {
        self.current_price = price;
        self.last_update = Utc::now();
    }

    /// Insert a freshly-constructed order into its resting location.
    pub(crate) fn insert(&mut self, order: Order) {
        match order.kind {
            OrderKind::Limit => {
                let price = order.price.expect("limit order carries a price");
                let side = order.side;
                self.locations.insert(order.id, Location::Limit { side, price });
                let book = self.side_map_mut(side);
                book.entry(price).or_insert_with(|| PriceLevel::new(price)).push_back(order);
            }
            OrderKind::Market => {
                self.locations.insert(order.id, Location::Market { side: order.side });
                match order.side {
                    OrderSide::Buy => self.market_buy_queue.push_back(order),
                    OrderSide::Sell => self.market_sell_queue.push_back(order),
                }
            }
        }
    }

    fn side_map_mut(&mut self, side: OrderSide) -> &mut BTreeMap<Decimal, PriceLevel> {
        match side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        }
    }

    /// Non-destructive lookup, used to validate a cancellation request
    /// before committing to removing the order from its resting spot.
    pub(crate) fn get(&self, order_id: OrderId) -> Option<&Order> {
        match self.locations.get(&order_id)? {
            Location::Limit { side, price } => match side {
                OrderSide::Buy => self.bids.get(price),
                OrderSide::Sell => self.asks.get(price),
            }
            .and_then(|level| level.orders.iter().find(|o| o.id == order_id)),
            Location::Market { side } => {
                let queue = match side {
                    OrderSide::Buy => &self.market_buy_queue,
                    OrderSide::Sell => &self.market_sell_queue,
                };
                queue.iter().find(|o| o.id == order_id)
            }
        }
    }

    /// Remove and return a resting order by id, wherever it lives.
    /// Used by cancellation; also used internally once a matched order's
    /// remaining side target is fully consumed.
    pub(crate) fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        match self.locations.remove(&order_id)? {
            Location::Limit { side, price } => {
                let book = self.side_map_mut(side);
                let level = book.get_mut(&price)?;
                let idx = level.orders.iter().position(|o| o.id == order_id)?;
                let removed = level.orders.remove(idx)?;
                level.total_quantity -= removed.remaining_base_equivalent(price);
                if level.is_empty() {
                    book.remove(&price);
                }
                Some(removed)
            }
            Location::Market { side } => {
                let queue = match side {
                    OrderSide::Buy => &mut self.market_buy_queue,
                    OrderSide::Sell => &mut self.market_sell_queue,
                };
                let idx = queue.iter().position(|o| o.id == order_id)?;
                queue.remove(idx)
            }
        }
    }

    pub(crate) fn has_market_order(&self, side: OrderSide) -> bool {
        match side {
            OrderSide::Buy => !self.market_buy_queue.is_empty(),
            OrderSide::Sell => !self.market_sell_queue.is_empty(),
        }
    }

    pub(crate) fn pop_front_market(&mut self, side: OrderSide) -> Option<Order> {
        let queue = match side {
            OrderSide::Buy => &mut self.market_buy_queue,
            OrderSide::Sell => &mut self.market_sell_queue,
        };
        let order = queue.pop_front()?;
        self.locations.remove(&order.id);
        Some(order)
    }

    pub(crate) fn push_front_market(&mut self, order: Order) {
        self.locations.insert(order.id, Location::Market { side: order.side });
        match order.side {
            OrderSide::Buy => self.market_buy_queue.push_front(order),
            OrderSide::Sell => self.market_sell_queue.push_front(order),
        }
    }

    pub(crate) fn best_bid_price(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    pub(crate) fn best_ask_price(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Pop the front (oldest) order of the best bid/ask level, decrementing
    /// that level's aggregate and dropping the level if now empty. The
    /// caller is responsible for re-inserting the order (via [`Self::requeue_front`])
    /// if it was only partially consumed.
    pub(crate) fn pop_best(&mut self, side: OrderSide) -> Option<Order> {
        let book = self.side_map_mut(side);
        let price = match side {
            OrderSide::Buy => *book.keys().next_back()?,
            OrderSide::Sell => *book.keys().next()?,
        };
        let level = book.get_mut(&price)?;
        let order = level.orders.pop_front()?;
        level.total_quantity -= order.remaining_base_equivalent(price);
        if level.is_empty() {
            book.remove(&price);
        }
        self.locations.remove(&order.id);
        Some(order)
    }

    /// Re-insert a partially-filled order at the front of its original
    /// price level, preserving FIFO priority for the remainder.
    pub(crate) fn requeue_front(&mut self, order: Order) {
        let price = order.price.expect("only limit orders are requeued to a price level");
        let side = order.side;
        self.locations.insert(order.id, Location::Limit { side, price });
        self.side_map_mut(side)
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_front(order);
    }

    pub(crate) fn snapshot(&self) -> OrderBookSnapshot {
        OrderBookSnapshot {
            bids: self.bids.values().rev().map(|l| (l.price, l.total_quantity)).collect(),
            asks: self.asks.values().map(|l| (l.price, l.total_quantity)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::TradingPair;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn limit_order(side: OrderSide, price: Decimal, base_amount: Decimal) -> Order {
        Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            side,
            OrderKind::Limit,
            TradingPair::BtcUsdt,
            Some(base_amount),
            None,
            Some(price),
            Utc::now(),
            0,
        )
        .unwrap()
    }

    #[test]
    fn best_prices_track_book_extremes() {
        let mut book = OrderBook::new(dec!(50000));
        book.insert(limit_order(OrderSide::Buy, dec!(49000), dec!(1)));
        book.insert(limit_order(OrderSide::Buy, dec!(49500), dec!(1)));
        book.insert(limit_order(OrderSide::Sell, dec!(51000), dec!(1)));
        book.insert(limit_order(OrderSide::Sell, dec!(50500), dec!(1)));

        assert_eq!(book.best_bid_price(), Some(dec!(49500)));
        assert_eq!(book.best_ask_price(), Some(dec!(50500)));
    }

    #[test]
    fn remove_drops_empty_level() {
        let mut book = OrderBook::new(dec!(50000));
        let order = limit_order(OrderSide::Buy, dec!(49000), dec!(1));
        let id = order.id;
        book.insert(order);
        assert!(book.remove(id).is_some());
        assert_eq!(book.best_bid_price(), None);
        assert!(book.bids.is_empty());
    }

    #[test]
    fn snapshot_orders_bids_descending_and_asks_ascending() {
        let mut book = OrderBook::new(dec!(50000));
        book.insert(limit_order(OrderSide::Buy, dec!(49000), dec!(1)));
        book.insert(limit_order(OrderSide::Buy, dec!(49500), dec!(1)));
        book.insert(limit_order(OrderSide::Sell, dec!(51000), dec!(1)));
        book.insert(limit_order(OrderSide::Sell, dec!(50500), dec!(1)));

        let snap = book.snapshot();
        assert_eq!(snap.bids, vec![(dec!(49500), dec!(1)), (dec!(49000), dec!(1))]);
        assert_eq!(snap.asks, vec![(dec!(50500), dec!(1)), (dec!(51000), dec!(1))]);
    }
}
