//! Matching engine (C6), one instance per trading pair. `place_order` is
//! the only entry point that mutates book state; it runs validation,
//! self-cross rejection, insertion, and the match loop to quiescence
//! before returning, per the single-threaded cooperative model (§5) —
//! there is no suspension point once a caller is inside `place_order`.
//!
//! Grounded in `matching_engine/src/lib.rs::OrderBook::match_order` for
//! the crossing loop shape (pop best, compare remaining quantities, push
//! back the remainder), generalized to settle balances per fill (the
//! teacher has no balance model to settle against) and to run a market-
//! order drain pass first, grounded in
//! `tmo/trading_pair.py::_execute_market_buy_internal` /
//! `_execute_market_sell_internal`.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::asset::{Asset, TradingPair};
use crate::book::{OrderBook, OrderBookSnapshot};
use crate::constants::{EPSILON, TRADE_HISTORY_CAPACITY};
use crate::error::ExchangeError;
use crate::order::{Order, OrderId, OrderKind, OrderSide, UserId};
use crate::trade::TradeSettlement;
use crate::user::User;

pub struct TradingPairEngine {
    pair: TradingPair,
    users: Arc<Mutex<std::collections::HashMap<UserId, User>>>,
    book: OrderBook,
    trade_history: VecDeque<TradeSettlement>,
    next_sequence: u64,
}

impl TradingPairEngine {
    pub(crate) fn new(
        pair: TradingPair,
        users: Arc<Mutex<std::collections::HashMap<UserId, User>>>,
    ) -> Self {
        Self {
            pair,
            users,
            book: OrderBook::new(pair.initial_price()),
            trade_history: VecDeque::with_capacity(TRADE_HISTORY_CAPACITY),
            next_sequence: 0,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    /// §4.5.1. `side`/`kind` together determine which of the spec's four
    /// `side_kind` variants this is; `base_amount`/`quote_amount`/`price`
    /// follow the Order construction rules.
    #[allow(clippy::too_many_arguments)]
    pub fn place_order(
        &mut self,
        user_id: UserId,
        side: OrderSide,
        kind: OrderKind,
        base_amount: Option<Decimal>,
        quote_amount: Option<Decimal>,
        price: Option<Decimal>,
    ) -> Result<Order, ExchangeError> {
        if !self.users.lock().contains_key(&user_id) {
            return Err(ExchangeError::UserNotFound(user_id));
        }

        let sequence = self.next_sequence();
        let order = Order::new(
            Uuid::new_v4(),
            user_id,
            side,
            kind,
            self.pair,
            base_amount,
            quote_amount,
            price,
            Utc::now(),
            sequence,
        )?;

        self.check_balance(&order)?;
        if kind == OrderKind::Limit {
            self.check_self_cross(&order)?;
        }

        let mut users = self.users.lock();
        let user = users.get_mut(&user_id).expect("checked above");
        user.add_active_order(order.clone());
        drop(users);

        self.book.insert(order.clone());
        self.run_match_loop();

        let users = self.users.lock();
        let user = users.get(&user_id).expect("checked above");
        Ok(user
            .active_order_by_id(self.pair, side, order.id)
            .cloned()
            .or_else(|| {
                user.get_completed_orders(self.pair)
                    .iter()
                    .find(|o| o.id == order.id)
                    .cloned()
            })
            .expect("order is always resting or completed after the match loop"))
    }

    fn required_asset_and_amount(&self, order: &Order) -> (Asset, Decimal) {
        let base = self.pair.base_asset();
        let quote = self.pair.quote_asset();
        match order.side {
            OrderSide::Buy => {
                let amount = match (order.base_amount, order.quote_amount, order.price) {
                    (Some(b), _, Some(p)) => b * p,
                    (Some(b), _, None) => b * self.book.current_price(),
                    (_, Some(q), _) => q,
                    _ => unreachable!("Order construction guarantees one amount is set"),
                };
                (quote, amount)
            }
            OrderSide::Sell => {
                let amount = match (order.base_amount, order.quote_amount, order.price) {
                    (Some(b), _, _) => b,
                    (_, Some(q), Some(p)) => q / p,
                    (_, Some(q), None) => q / self.book.current_price(),
                    _ => unreachable!("Order construction guarantees one amount is set"),
                };
                (base, amount)
            }
        }
    }

    fn check_balance(&self, order: &Order) -> Result<(), ExchangeError> {
        let (asset, required) = self.required_asset_and_amount(order);
        let users = self.users.lock();
        let user = users.get(&order.user_id).expect("checked by caller");
        let available = user.get_available_balance(asset);
        if available < required {
            return Err(ExchangeError::InsufficientBalance { asset, required, available });
        }
        Ok(())
    }

    /// §4.5.1 step 3: limit orders only.
    fn check_self_cross(&self, order: &Order) -> Result<(), ExchangeError> {
        let users = self.users.lock();
        let user = users.get(&order.user_id).expect("checked by caller");
        let incoming_price = order.price.expect("limit order carries a price");
        let opposite = order.side.opposite();

        for resting in user.get_active_orders(self.pair, opposite) {
            if resting.kind != OrderKind::Limit {
                continue;
            }
            let resting_price = resting.price.expect("limit order carries a price");
            let crosses = match order.side {
                OrderSide::Buy => resting_price < incoming_price,
                OrderSide::Sell => resting_price > incoming_price,
            };
            if crosses {
                return Err(ExchangeError::PriceCrossing {
                    resting_side: opposite,
                    resting_price,
                    incoming_price,
                });
            }
        }
        Ok(())
    }

    /// §4.5.2: Phase A drains resting market orders against the limit
    /// book, then Phase B crosses the limit book against itself, looping
    /// until neither phase can make further progress.
    fn run_match_loop(&mut self) {
        loop {
            let a = self.drain_market_side(OrderSide::Buy);
            let b = self.drain_market_side(OrderSide::Sell);
            let c = self.cross_limit_book();
            if !a && !b && !c {
                break;
            }
        }
    }

    fn drain_market_side(&mut self, side: OrderSide) -> bool {
        let opposite = side.opposite();
        let mut progressed = false;

        loop {
            if !self.book.has_market_order(side) {
                break;
            }
            let best_price = match opposite {
                OrderSide::Sell => self.book.best_ask_price(),
                OrderSide::Buy => self.book.best_bid_price(),
            };
            let Some(price) = best_price else { break };

            let mut market_order = self.book.pop_front_market(side).expect("checked above");
            let mut resting = self.book.pop_best(opposite).expect("price existed above");

            let quantity = market_order
                .remaining_base_equivalent(price)
                .min(resting.remaining_base_equivalent(price));
            assert!(
                quantity > EPSILON,
                "match loop would settle a sub-EPSILON trade: precision bug in upstream amount computation"
            );

            self.settle(side, &mut market_order, &mut resting, quantity, price);
            progressed = true;

            self.restore_or_finalize(resting);
            if market_order.status.is_terminal() {
                self.finalize_order(&market_order);
            } else {
                self.book.push_front_market(market_order);
            }
        }

        progressed
    }

    /// §4.5.2 Phase B: `while best_bid >= best_ask`, trade at the maker's
    /// (earlier-timestamp / resting) price.
    fn cross_limit_book(&mut self) -> bool {
        let mut progressed = false;

        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.book.best_bid_price(), self.book.best_ask_price())
            else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            let mut bid = self.book.pop_best(OrderSide::Buy).expect("bid price existed");
            let mut ask = self.book.pop_best(OrderSide::Sell).expect("ask price existed");

            let maker_price = if bid.timestamp <= ask.timestamp { bid_price } else { ask_price };
            let quantity = bid
                .remaining_base_equivalent(maker_price)
                .min(ask.remaining_base_equivalent(maker_price));
            assert!(
                quantity > EPSILON,
                "match loop would settle a sub-EPSILON trade: precision bug in upstream amount computation"
            );

            self.settle(OrderSide::Buy, &mut bid, &mut ask, quantity, maker_price);
            progressed = true;

            self.restore_or_finalize(bid);
            self.restore_or_finalize(ask);
        }

        progressed
    }

    fn restore_or_finalize(&mut self, order: Order) {
        if order.status.is_terminal() {
            self.finalize_order(&order);
        } else {
            self.book.requeue_front(order);
        }
    }

    /// §4.5.3, the full 6-step trade construction and settlement
    /// sequence. `initiator_side` identifies which of the two mutable
    /// orders is the buy side, since the drain/cross call sites don't
    /// always hand them in (buy, sell) order.
    fn settle(
        &mut self,
        initiator_side: OrderSide,
        a: &mut Order,
        b: &mut Order,
        quantity: Decimal,
        price: Decimal,
    ) {
        let (buy, sell): (&mut Order, &mut Order) = match initiator_side {
            OrderSide::Buy => (a, b),
            OrderSide::Sell => (b, a),
        };

        buy.apply_fill(quantity, price);
        sell.apply_fill(quantity, price);

        let trade = TradeSettlement {
            id: Uuid::new_v4(),
            buy_order_id: buy.id,
            sell_order_id: sell.id,
            trading_pair: self.pair,
            base_amount: quantity,
            price,
            timestamp: Utc::now(),
        };
        if self.trade_history.len() >= TRADE_HISTORY_CAPACITY {
            self.trade_history.pop_front();
        }
        self.trade_history.push_back(trade);

        let base = self.pair.base_asset();
        let quote = self.pair.quote_asset();
        let quote_amount = quantity * price;
        {
            let mut users = self.users.lock();
            if let Some(buyer) = users.get_mut(&buy.user_id) {
                buyer.update_total_asset(base, quantity);
                buyer.update_total_asset(quote, -quote_amount);
                buyer.sync_order(buy);
            }
            if let Some(seller) = users.get_mut(&sell.user_id) {
                seller.update_total_asset(quote, quote_amount);
                seller.update_total_asset(base, -quantity);
                seller.sync_order(sell);
            }
        }

        self.book.record_trade_price(price);
        tracing::debug!(
            pair = %self.pair,
            buy_order = %buy.id,
            sell_order = %sell.id,
            %quantity,
            %price,
            "trade settled"
        );
    }

    fn finalize_order(&self, order: &Order) {
        let mut users = self.users.lock();
        if let Some(user) = users.get_mut(&order.user_id) {
            user.sync_order(order);
        }
    }

    /// §4.5.4. Returns `false` (not an error) when the order isn't live,
    /// isn't owned by `user_id`, or is already terminal.
    pub fn cancel_order(&mut self, user_id: UserId, order_id: OrderId) -> bool {
        match self.book.get(order_id) {
            Some(order) if order.user_id == user_id && !order.status.is_terminal() => {}
            _ => return false,
        }

        let mut order = self.book.remove(order_id).expect("checked above");
        order.cancel();
        self.finalize_order(&order);
        tracing::debug!(pair = %self.pair, order = %order_id, "order cancelled");
        true
    }

    pub fn get_order_book_snapshot(&self) -> OrderBookSnapshot {
        self.book.snapshot()
    }

    pub fn get_recent_trades(&self, limit: usize) -> Vec<TradeSettlement> {
        self.trade_history.iter().rev().take(limit).cloned().collect()
    }

    pub fn get_current_price(&self) -> Decimal {
        self.book.current_price()
    }
}
