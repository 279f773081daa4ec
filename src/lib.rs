//! Simulated spot trading exchange core: a price-time-priority limit
//! order book with integrated matching, balance accounting, and trade
//! settlement across `BTC/USDT`, `ETH/USDT`, `ETH/BTC`. A library, not a
//! service — no persistence, networking, or fee model.

mod asset;
mod book;
mod constants;
mod engine;
mod error;
mod exchange;
mod order;
mod trade;
mod user;

pub use asset::{Asset, TradingPair};
pub use book::OrderBookSnapshot;
pub use engine::TradingPairEngine;
pub use error::ExchangeError;
pub use exchange::Exchange;
pub use order::{Order, OrderId, OrderKind, OrderSide, OrderStatus, UserId};
pub use trade::{TradeId, TradeSettlement};
pub use user::User;
