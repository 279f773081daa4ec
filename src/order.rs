//! Order entity (C3): immutable intent fields plus mutable fill progress
//! and status lifecycle. Status transitions are monotone:
//! `Pending -> PartiallyFilled -> Filled`, or `Pending/PartiallyFilled -> Cancelled`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::TradingPair;
use crate::constants::EPSILON;
use crate::error::ExchangeError;

pub type OrderId = Uuid;
pub type UserId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A resting or completed order. `id`, `user_id`, `side`, `kind`,
/// `trading_pair`, `base_amount`, `quote_amount`, `price` and `timestamp`
/// are frozen at construction; only `filled_base_amount`,
/// `filled_quote_amount`, `average_execution_price` and `status` mutate,
/// and only through [`Order::apply_fill`] / [`Order::cancel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub trading_pair: TradingPair,
    pub base_amount: Option<Decimal>,
    pub quote_amount: Option<Decimal>,
    pub price: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    /// Monotonic insertion sequence, used to break ties at equal timestamp
    /// (OQ3): the book only ever holds orders inserted before the current
    /// match pass, so "resting" and "earlier (timestamp, sequence)" coincide.
    pub sequence: u64,
    pub filled_base_amount: Decimal,
    pub filled_quote_amount: Decimal,
    pub average_execution_price: Decimal,
    pub status: OrderStatus,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: OrderId,
        user_id: UserId,
        side: OrderSide,
        kind: OrderKind,
        trading_pair: TradingPair,
        base_amount: Option<Decimal>,
        quote_amount: Option<Decimal>,
        price: Option<Decimal>,
        timestamp: DateTime<Utc>,
        sequence: u64,
    ) -> Result<Self, ExchangeError> {
        Self::validate_amounts(base_amount, quote_amount)?;
        Self::validate_price(kind, price)?;

        Ok(Self {
            id,
            user_id,
            side,
            kind,
            trading_pair,
            base_amount,
            quote_amount,
            price,
            timestamp,
            sequence,
            filled_base_amount: Decimal::ZERO,
            filled_quote_amount: Decimal::ZERO,
            average_execution_price: Decimal::ZERO,
            status: OrderStatus::Pending,
        })
    }

    fn validate_amounts(
        base_amount: Option<Decimal>,
        quote_amount: Option<Decimal>,
    ) -> Result<(), ExchangeError> {
        match (base_amount, quote_amount) {
            (Some(_), Some(_)) => Err(ExchangeError::InvalidOrderParameters {
                reason: "base_amount and quote_amount are mutually exclusive".into(),
            }),
            (None, None) => Err(ExchangeError::InvalidOrderParameters {
                reason: "exactly one of base_amount or quote_amount must be set".into(),
            }),
            (Some(b), _) if b <= Decimal::ZERO => Err(ExchangeError::InvalidOrderParameters {
                reason: "base_amount must be strictly positive".into(),
            }),
            (_, Some(q)) if q <= Decimal::ZERO => Err(ExchangeError::InvalidOrderParameters {
                reason: "quote_amount must be strictly positive".into(),
            }),
            _ => Ok(()),
        }
    }

    fn validate_price(kind: OrderKind, price: Option<Decimal>) -> Result<(), ExchangeError> {
        match (kind, price) {
            (OrderKind::Limit, None) => Err(ExchangeError::InvalidOrderParameters {
                reason: "limit orders require a price".into(),
            }),
            (OrderKind::Limit, Some(p)) if p <= Decimal::ZERO => {
                Err(ExchangeError::InvalidOrderParameters {
                    reason: "limit order price must be strictly positive".into(),
                })
            }
            (OrderKind::Market, Some(_)) => Err(ExchangeError::InvalidOrderParameters {
                reason: "market orders must not specify a price".into(),
            }),
            _ => Ok(()),
        }
    }

    /// Clamped to zero: repeated division/multiplication through
    /// [`Self::remaining_base_equivalent`] can leave a sub-EPSILON
    /// residue on either side of zero that has no economic meaning.
    pub fn remaining_base_amount(&self) -> Decimal {
        self.base_amount
            .map(|b| (b - self.filled_base_amount).max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn remaining_quote_amount(&self) -> Decimal {
        self.quote_amount
            .map(|q| (q - self.filled_quote_amount).max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO)
    }

    /// Remaining size expressed in base units, using `match_price` to
    /// convert a quote-denominated target (a budget, or a market order's
    /// quote target) — `match_price` is the order's own price for a
    /// limit order, or the counterparty's resting price for a market
    /// order, which has none of its own.
    pub(crate) fn remaining_base_equivalent(&self, match_price: Decimal) -> Decimal {
        if self.base_amount.is_some() {
            self.remaining_base_amount()
        } else if match_price > Decimal::ZERO {
            self.remaining_quote_amount() / match_price
        } else {
            Decimal::ZERO
        }
    }

    /// Within `EPSILON` counts as filled, so a market order whose quote
    /// target was reconstructed via `quantity / price` division doesn't
    /// stick at PartiallyFilled forever over rounding dust.
    pub fn is_filled(&self) -> bool {
        match (self.base_amount, self.quote_amount) {
            (Some(b), _) => self.filled_base_amount >= b - EPSILON,
            (_, Some(q)) => self.filled_quote_amount >= q - EPSILON,
            _ => false,
        }
    }

    pub fn is_partially_filled(&self) -> bool {
        match (self.base_amount, self.quote_amount) {
            (Some(b), _) => self.filled_base_amount > Decimal::ZERO && self.filled_base_amount < b,
            (_, Some(q)) => self.filled_quote_amount > Decimal::ZERO && self.filled_quote_amount < q,
            _ => false,
        }
    }

    /// Advance fill state by `quantity` base units at `price`; recompute
    /// average execution price and status (§4.5.3 steps 1-2).
    pub(crate) fn apply_fill(&mut self, quantity: Decimal, price: Decimal) {
        self.filled_base_amount += quantity;
        self.filled_quote_amount += quantity * price;
        if self.filled_base_amount > Decimal::ZERO {
            self.average_execution_price = self.filled_quote_amount / self.filled_base_amount;
        }
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else if self.is_partially_filled() {
            OrderStatus::PartiallyFilled
        } else {
            self.status
        };
    }

    pub(crate) fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn rejects_both_amounts_set() {
        let err = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            OrderSide::Buy,
            OrderKind::Limit,
            TradingPair::BtcUsdt,
            Some(dec!(1)),
            Some(dec!(1)),
            Some(dec!(50000)),
            now(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidOrderParameters { .. }));
    }

    #[test]
    fn rejects_neither_amount_set() {
        let err = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            OrderSide::Buy,
            OrderKind::Limit,
            TradingPair::BtcUsdt,
            None,
            None,
            Some(dec!(50000)),
            now(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidOrderParameters { .. }));
    }

    #[test]
    fn rejects_limit_without_price() {
        let err = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            OrderSide::Buy,
            OrderKind::Limit,
            TradingPair::BtcUsdt,
            Some(dec!(1)),
            None,
            None,
            now(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidOrderParameters { .. }));
    }

    #[test]
    fn rejects_market_with_price() {
        let err = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            OrderSide::Buy,
            OrderKind::Market,
            TradingPair::BtcUsdt,
            Some(dec!(1)),
            None,
            Some(dec!(50000)),
            now(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidOrderParameters { .. }));
    }

    #[test]
    fn fill_progress_and_status_transitions() {
        let mut order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            OrderSide::Buy,
            OrderKind::Limit,
            TradingPair::BtcUsdt,
            Some(dec!(2)),
            None,
            Some(dec!(50000)),
            now(),
            0,
        )
        .unwrap();

        order.apply_fill(dec!(1), dec!(50000));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining_base_amount(), dec!(1));
        assert_eq!(order.average_execution_price, dec!(50000));

        order.apply_fill(dec!(1), dec!(50000));
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.remaining_base_amount(), dec!(0));
    }
}
