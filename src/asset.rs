//! Asset and trading-pair taxonomy (C1).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of assets the exchange supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Usdt,
    Btc,
    Eth,
}

impl Asset {
    /// Benchmark value in USDT-equivalent units, used only to seed initial pair prices.
    pub fn initial_value(self) -> Decimal {
        match self {
            Asset::Usdt => dec!(1),
            Asset::Btc => dec!(50000),
            Asset::Eth => dec!(3000),
        }
    }

    /// The trading pairs this asset participates in, base or quote side.
    /// Load-bearing for locked-balance derivation (§4.2): a user's locked
    /// balance for an asset is only ever found by walking these pairs.
    pub fn trading_pairs(self) -> &'static [TradingPair] {
        match self {
            Asset::Usdt => &[TradingPair::BtcUsdt, TradingPair::EthUsdt],
            Asset::Btc => &[TradingPair::BtcUsdt, TradingPair::EthBtc],
            Asset::Eth => &[TradingPair::EthUsdt, TradingPair::EthBtc],
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Usdt => write!(f, "USDT"),
            Asset::Btc => write!(f, "BTC"),
            Asset::Eth => write!(f, "ETH"),
        }
    }
}

/// Closed set of trading pairs, each backed by exactly one [`crate::engine::TradingPairEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingPair {
    BtcUsdt,
    EthUsdt,
    EthBtc,
}

impl TradingPair {
    pub const ALL: [TradingPair; 3] = [TradingPair::BtcUsdt, TradingPair::EthUsdt, TradingPair::EthBtc];

    pub fn base_asset(self) -> Asset {
        match self {
            TradingPair::BtcUsdt => Asset::Btc,
            TradingPair::EthUsdt => Asset::Eth,
            TradingPair::EthBtc => Asset::Eth,
        }
    }

    pub fn quote_asset(self) -> Asset {
        match self {
            TradingPair::BtcUsdt => Asset::Usdt,
            TradingPair::EthUsdt => Asset::Usdt,
            TradingPair::EthBtc => Asset::Btc,
        }
    }

    /// `base.initial_value / quote.initial_value`, used to seed the book's `current_price`.
    pub fn initial_price(self) -> Decimal {
        self.base_asset().initial_value() / self.quote_asset().initial_value()
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base_asset(), self.quote_asset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn btc_usdt_initial_price_is_fifty_thousand() {
        assert_eq!(TradingPair::BtcUsdt.initial_price(), dec!(50000));
    }

    #[test]
    fn eth_btc_initial_price_is_ratio() {
        assert_eq!(TradingPair::EthBtc.initial_price(), dec!(3000) / dec!(50000));
    }

    #[test]
    fn asset_trading_pairs_are_symmetric_with_base_quote() {
        for pair in TradingPair::ALL {
            assert!(pair.base_asset().trading_pairs().contains(&pair));
            assert!(pair.quote_asset().trading_pairs().contains(&pair));
        }
    }

    #[test]
    fn symbol_display() {
        assert_eq!(TradingPair::BtcUsdt.to_string(), "BTC/USDT");
    }
}
