//! Tunable constants for the exchange core.
//!
//! This crate has no deployment surface (no env vars, no config files) —
//! these are the few knobs a production exchange core still needs, kept
//! at a single site the way `accounts/src/models/trade.rs` keeps `FEE_RATE`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Floor below which a computed trade size is treated as a precision bug
/// upstream rather than a legitimate fill, per the matching loop's
/// execution invariant (E1).
pub const EPSILON: Decimal = dec!(0.0000000001);

/// Maximum number of entries retained in a trading pair's trade history
/// ring buffer; oldest entries are dropped on overflow.
pub const TRADE_HISTORY_CAPACITY: usize = 1000;
