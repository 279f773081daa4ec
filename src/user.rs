//! User balance ledger (C2) and active-order index (C4).
//!
//! `total_assets` is the only stored balance state. `locked_balance` is
//! always derived by walking the active-order index — "the apparent
//! lock is purely derived" (spec §3). Orders do not hold a back-reference
//! to their user (they carry `user_id`), so `User` can safely own full
//! `Order` clones in its indices without creating a reference cycle; the
//! engine is the single writer that keeps these copies in sync with the
//! canonical copies living in the order book.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::{Asset, TradingPair};
use crate::error::ExchangeError;
use crate::order::{Order, OrderId, OrderSide, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,

    total_assets: HashMap<Asset, Decimal>,
    active_orders: HashMap<(TradingPair, OrderSide), Vec<Order>>,
    completed_orders: HashMap<TradingPair, Vec<Order>>,
}

impl User {
    pub(crate) fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
            total_assets: HashMap::new(),
            active_orders: HashMap::new(),
            completed_orders: HashMap::new(),
        }
    }

    pub fn get_total_balance(&self, asset: Asset) -> Decimal {
        self.total_assets.get(&asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum, over every live order touching `asset`, of the asset amount
    /// that order would still consume if fully filled (§4.2's six cases,
    /// evaluated against each order's *remaining* amount so that a
    /// partial fill releases the already-settled portion of the lock).
    pub fn get_locked_balance(&self, asset: Asset) -> Decimal {
        let mut locked = Decimal::ZERO;

        for &pair in asset.trading_pairs() {
            if let Some(buys) = self.active_orders.get(&(pair, OrderSide::Buy)) {
                for order in buys {
                    locked += Self::buy_lock_contribution(order, pair, asset);
                }
            }
            if let Some(sells) = self.active_orders.get(&(pair, OrderSide::Sell)) {
                for order in sells {
                    locked += Self::sell_lock_contribution(order, pair, asset);
                }
            }
        }

        locked
    }

    fn buy_lock_contribution(order: &Order, pair: TradingPair, asset: Asset) -> Decimal {
        if pair.quote_asset() != asset {
            return Decimal::ZERO;
        }
        if order.base_amount.is_some() {
            if let Some(price) = order.price {
                return order.remaining_base_amount() * price;
            }
            return Decimal::ZERO;
        }
        if order.quote_amount.is_some() {
            return order.remaining_quote_amount();
        }
        Decimal::ZERO
    }

    fn sell_lock_contribution(order: &Order, pair: TradingPair, asset: Asset) -> Decimal {
        if pair.base_asset() != asset {
            return Decimal::ZERO;
        }
        if order.base_amount.is_some() {
            return order.remaining_base_amount();
        }
        if order.quote_amount.is_some() {
            if let Some(price) = order.price {
                return order.remaining_quote_amount() / price;
            }
            return Decimal::ZERO;
        }
        Decimal::ZERO
    }

    pub fn get_available_balance(&self, asset: Asset) -> Decimal {
        let total = self.get_total_balance(asset);
        let locked = self.get_locked_balance(asset);
        (total - locked).max(Decimal::ZERO)
    }

    pub fn deposit(&mut self, asset: Asset, amount: Decimal) -> Result<(), ExchangeError> {
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::NonPositiveAmount(amount));
        }
        *self.total_assets.entry(asset).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    pub fn withdraw(&mut self, asset: Asset, amount: Decimal) -> Result<(), ExchangeError> {
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::NonPositiveAmount(amount));
        }
        let available = self.get_available_balance(asset);
        if available < amount {
            return Err(ExchangeError::InsufficientBalance {
                asset,
                required: amount,
                available,
            });
        }
        *self.total_assets.entry(asset).or_insert(Decimal::ZERO) -= amount;
        Ok(())
    }

    /// Settlement-only: mutate total assets by `delta`, which may be
    /// negative. Never called such that the result goes negative under
    /// correct use (conservation, §4.2 I1/I2).
    pub(crate) fn update_total_asset(&mut self, asset: Asset, delta: Decimal) {
        *self.total_assets.entry(asset).or_insert(Decimal::ZERO) += delta;
    }

    pub(crate) fn add_active_order(&mut self, order: Order) {
        self.active_orders
            .entry((order.trading_pair, order.side))
            .or_default()
            .push(order);
    }

    /// Replace the user's copy of `order` with a freshly-mutated snapshot
    /// from the engine; migrates it to `completed_orders` if terminal.
    pub(crate) fn sync_order(&mut self, order: &Order) {
        let key = (order.trading_pair, order.side);
        if let Some(orders) = self.active_orders.get_mut(&key) {
            if let Some(slot) = orders.iter_mut().find(|o| o.id == order.id) {
                *slot = order.clone();
                if order.status.is_terminal() {
                    let completed = orders.remove(
                        orders
                            .iter()
                            .position(|o| o.id == order.id)
                            .expect("order just found above"),
                    );
                    self.completed_orders
                        .entry(order.trading_pair)
                        .or_default()
                        .push(completed);
                }
            }
        }
    }

    pub fn get_active_orders(&self, pair: TradingPair, side: OrderSide) -> &[Order] {
        self.active_orders
            .get(&(pair, side))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_completed_orders(&self, pair: TradingPair) -> &[Order] {
        self.completed_orders
            .get(&pair)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn active_order_by_id(&self, pair: TradingPair, side: OrderSide, id: OrderId) -> Option<&Order> {
        self.get_active_orders(pair, side).iter().find(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(
        side: OrderSide,
        kind: crate::order::OrderKind,
        base_amount: Option<Decimal>,
        quote_amount: Option<Decimal>,
        price: Option<Decimal>,
    ) -> Order {
        Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            side,
            kind,
            TradingPair::BtcUsdt,
            base_amount,
            quote_amount,
            price,
            Utc::now(),
            0,
        )
        .unwrap()
    }

    #[test]
    fn deposit_and_withdraw_round_trip() {
        let mut user = User::new("alice", "alice@example.com");
        user.deposit(Asset::Usdt, dec!(1000)).unwrap();
        assert_eq!(user.get_total_balance(Asset::Usdt), dec!(1000));
        user.withdraw(Asset::Usdt, dec!(400)).unwrap();
        assert_eq!(user.get_total_balance(Asset::Usdt), dec!(600));
    }

    #[test]
    fn withdraw_more_than_available_fails() {
        let mut user = User::new("alice", "alice@example.com");
        user.deposit(Asset::Usdt, dec!(100)).unwrap();
        let err = user.withdraw(Asset::Usdt, dec!(200)).unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientBalance { .. }));
    }

    #[test]
    fn nonpositive_deposit_and_withdraw_rejected() {
        let mut user = User::new("alice", "alice@example.com");
        assert!(matches!(
            user.deposit(Asset::Usdt, dec!(0)),
            Err(ExchangeError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            user.withdraw(Asset::Usdt, dec!(-1)),
            Err(ExchangeError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn locked_balance_from_limit_buy_with_base_amount() {
        let mut user = User::new("alice", "alice@example.com");
        user.deposit(Asset::Usdt, dec!(100000)).unwrap();
        let o = order(
            OrderSide::Buy,
            crate::order::OrderKind::Limit,
            Some(dec!(1)),
            None,
            Some(dec!(50000)),
        );
        user.add_active_order(o);
        assert_eq!(user.get_locked_balance(Asset::Usdt), dec!(50000));
        assert_eq!(user.get_available_balance(Asset::Usdt), dec!(50000));
    }

    #[test]
    fn locked_balance_drops_as_remaining_shrinks() {
        let mut user = User::new("alice", "alice@example.com");
        user.deposit(Asset::Usdt, dec!(100000)).unwrap();
        let mut o = order(
            OrderSide::Buy,
            crate::order::OrderKind::Limit,
            Some(dec!(2)),
            None,
            Some(dec!(50000)),
        );
        user.add_active_order(o.clone());
        assert_eq!(user.get_locked_balance(Asset::Usdt), dec!(100000));

        o.apply_fill(dec!(1), dec!(50000));
        user.sync_order(&o);
        assert_eq!(user.get_locked_balance(Asset::Usdt), dec!(50000));
        assert_eq!(user.get_available_balance(Asset::Usdt), dec!(50000));
    }

    #[test]
    fn sync_order_migrates_terminal_orders_to_completed() {
        let mut user = User::new("alice", "alice@example.com");
        user.deposit(Asset::Usdt, dec!(100000)).unwrap();
        let mut o = order(
            OrderSide::Buy,
            crate::order::OrderKind::Limit,
            Some(dec!(1)),
            None,
            Some(dec!(50000)),
        );
        user.add_active_order(o.clone());
        o.apply_fill(dec!(1), dec!(50000));
        user.sync_order(&o);

        assert!(user.get_active_orders(TradingPair::BtcUsdt, OrderSide::Buy).is_empty());
        assert_eq!(user.get_completed_orders(TradingPair::BtcUsdt).len(), 1);
    }
}
