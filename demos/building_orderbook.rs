use exchange_core::{Asset, Exchange, OrderKind, OrderSide, TradingPair};
use rust_decimal_macros::dec;

fn main() {
    let mut exchange = Exchange::new();
    let alice = exchange.create_user("alice", "alice@example.com").unwrap();
    exchange.deposit(alice, Asset::Usdt, dec!(200000)).unwrap();

    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
    engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(1)), None, Some(dec!(49000)))
        .unwrap();
    engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(1.5)), None, Some(dec!(48500)))
        .unwrap();
    engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(2)), None, Some(dec!(47000)))
        .unwrap();

    let snapshot = engine.get_order_book_snapshot();
    println!("Bids (price, quantity), best first:");
    for (price, quantity) in &snapshot.bids {
        println!("  {price} x {quantity}");
    }
    println!("Best bid: {:?}", engine.get_order_book_snapshot().bids.first());
}
