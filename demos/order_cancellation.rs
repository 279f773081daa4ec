use exchange_core::{Asset, Exchange, OrderKind, OrderSide, TradingPair};
use rust_decimal_macros::dec;

fn main() {
    let mut exchange = Exchange::new();
    let alice = exchange.create_user("alice", "alice@example.com").unwrap();
    exchange.deposit(alice, Asset::Usdt, dec!(1000)).unwrap();

    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
    let order = engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(0.01)), None, Some(dec!(100000)))
        .unwrap();

    println!(
        "Available USDT before cancel: {}",
        exchange.get_user(alice).unwrap().get_available_balance(Asset::Usdt)
    );

    let cancelled = exchange.get_trading_pair(TradingPair::BtcUsdt).cancel_order(alice, order.id);
    println!("Cancelled: {cancelled}");
    println!(
        "Available USDT after cancel: {}",
        exchange.get_user(alice).unwrap().get_available_balance(Asset::Usdt)
    );

    let retry = exchange.get_trading_pair(TradingPair::BtcUsdt).cancel_order(alice, order.id);
    println!("Cancelling an already-cancelled order returns: {retry}");
}
