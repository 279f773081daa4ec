//! Trade settlement record (C7). Immutable once created; settlements
//! reference their orders by id rather than owning them, per the
//! arena-and-id pattern used to break the Order/User/Trade reference cycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::TradingPair;
use crate::order::OrderId;

pub type TradeId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSettlement {
    pub id: TradeId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub trading_pair: TradingPair,
    pub base_amount: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}
