//! Error taxonomy (§7). `cancel_order` deliberately returns `bool`, not a
//! `Result` here — a cancellation attempt on a non-existent or already
//! terminal order is a normal idempotent outcome, not a failure.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::asset::Asset;
use crate::order::OrderSide;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid order parameters: {reason}")]
    InvalidOrderParameters { reason: String },

    #[error("insufficient {asset} balance: required {required}, available {available}")]
    InsufficientBalance {
        asset: Asset,
        required: Decimal,
        available: Decimal,
    },

    #[error("order at {incoming_price} would cross user's own resting {resting_side:?} at {resting_price}")]
    PriceCrossing {
        resting_side: OrderSide,
        resting_price: Decimal,
        incoming_price: Decimal,
    },

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("user not found: {0}")]
    UserNotFound(Uuid),
}
