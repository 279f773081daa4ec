use exchange_core::{Asset, Exchange, OrderKind, OrderSide, TradingPair};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    let mut exchange = Exchange::new();
    let alice = exchange.create_user("alice", "alice@example.com").unwrap();
    let bob = exchange.create_user("bob", "bob@example.com").unwrap();
    exchange.deposit(alice, Asset::Usdt, dec!(200000)).unwrap();
    exchange.deposit(bob, Asset::Btc, dec!(50)).unwrap();

    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
    engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(10)), None, Some(dec!(49900)))
        .unwrap();
    engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(15)), None, Some(dec!(49800)))
        .unwrap();
    engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(20)), None, Some(dec!(49700)))
        .unwrap();

    let taker = engine
        .place_order(bob, OrderSide::Sell, OrderKind::Limit, Some(dec!(25)), None, Some(dec!(49800)))
        .unwrap();

    let filled: Decimal = taker.filled_base_amount;
    println!("Sell order filled {filled} BTC across the crossed levels");
    println!("Remaining on the book: best bid {:?}", engine.get_order_book_snapshot().bids.first());

    assert_eq!(filled, dec!(25));
    assert_eq!(engine.get_order_book_snapshot().bids.first(), Some(&(dec!(49700), dec!(20))));
}
