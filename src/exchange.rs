//! Exchange facade (C8): user registry plus one [`TradingPairEngine`] per
//! pair, sharing the user map so engines can resolve `user_id -> User`
//! during settlement without engines owning the registry themselves.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::asset::{Asset, TradingPair};
use crate::engine::TradingPairEngine;
use crate::error::ExchangeError;
use crate::order::UserId;
use crate::user::User;

pub struct Exchange {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    engines: HashMap<TradingPair, TradingPairEngine>,
}

impl Exchange {
    pub fn new() -> Self {
        let users = Arc::new(Mutex::new(HashMap::new()));
        let engines = TradingPair::ALL
            .into_iter()
            .map(|pair| (pair, TradingPairEngine::new(pair, Arc::clone(&users))))
            .collect();
        Self { users, engines }
    }

    pub fn create_user(
        &mut self,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<UserId, ExchangeError> {
        let username = username.into();
        let mut users = self.users.lock();
        if users.values().any(|u| u.username == username) {
            return Err(ExchangeError::DuplicateUsername(username));
        }
        let user = User::new(username, email);
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    pub fn get_user(&self, user_id: UserId) -> Option<User> {
        self.users.lock().get(&user_id).cloned()
    }

    pub fn get_trading_pair(&mut self, pair: TradingPair) -> &mut TradingPairEngine {
        self.engines.get_mut(&pair).expect("one engine per TradingPair::ALL entry")
    }

    pub fn deposit(&mut self, user_id: UserId, asset: Asset, amount: Decimal) -> Result<(), ExchangeError> {
        let mut users = self.users.lock();
        let user = users.get_mut(&user_id).ok_or(ExchangeError::UserNotFound(user_id))?;
        user.deposit(asset, amount)
    }

    pub fn withdraw(&mut self, user_id: UserId, asset: Asset, amount: Decimal) -> Result<(), ExchangeError> {
        let mut users = self.users.lock();
        let user = users.get_mut(&user_id).ok_or(ExchangeError::UserNotFound(user_id))?;
        user.withdraw(asset, amount)
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_usernames() {
        let mut exchange = Exchange::new();
        exchange.create_user("alice", "alice@example.com").unwrap();
        let err = exchange.create_user("alice", "alice2@example.com").unwrap_err();
        assert!(matches!(err, ExchangeError::DuplicateUsername(_)));
    }

    #[test]
    fn one_engine_per_pair() {
        let mut exchange = Exchange::new();
        for pair in TradingPair::ALL {
            assert_eq!(exchange.get_trading_pair(pair).get_current_price(), pair.initial_price());
        }
    }
}
