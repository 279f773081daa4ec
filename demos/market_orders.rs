use exchange_core::{Asset, Exchange, OrderKind, OrderSide, TradingPair};
use rust_decimal_macros::dec;

fn main() {
    let mut exchange = Exchange::new();
    let alice = exchange.create_user("alice", "alice@example.com").unwrap();
    let bob = exchange.create_user("bob", "bob@example.com").unwrap();
    exchange.deposit(alice, Asset::Usdt, dec!(200000)).unwrap();
    exchange.deposit(bob, Asset::Btc, dec!(10)).unwrap();

    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
    engine
        .place_order(bob, OrderSide::Sell, OrderKind::Limit, Some(dec!(1)), None, Some(dec!(50000)))
        .unwrap();
    engine
        .place_order(bob, OrderSide::Sell, OrderKind::Limit, Some(dec!(1)), None, Some(dec!(51000)))
        .unwrap();

    let market_buy = engine
        .place_order(alice, OrderSide::Buy, OrderKind::Market, None, Some(dec!(75000)), None)
        .unwrap();

    println!("Market buy status: {:?}", market_buy.status);
    println!("Recent trades: {:?}", engine.get_recent_trades(5));
    println!("Current price: {}", engine.get_current_price());

    let alice_user = exchange.get_user(alice).unwrap();
    println!("Alice BTC: {}", alice_user.get_total_balance(Asset::Btc));
}
