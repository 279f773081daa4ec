use exchange_core::{Asset, Exchange, OrderKind, OrderSide, TradingPair};
use rust_decimal_macros::dec;

fn main() {
    let mut exchange = Exchange::new();
    let alice = exchange.create_user("alice", "alice@example.com").unwrap();
    let bob = exchange.create_user("bob", "bob@example.com").unwrap();
    exchange.deposit(alice, Asset::Usdt, dec!(200000)).unwrap();
    exchange.deposit(bob, Asset::Btc, dec!(10)).unwrap();

    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
    let buy = engine
        .place_order(alice, OrderSide::Buy, OrderKind::Limit, Some(dec!(3)), None, Some(dec!(50000)))
        .unwrap();

    let sell = engine
        .place_order(bob, OrderSide::Sell, OrderKind::Limit, Some(dec!(1)), None, Some(dec!(50000)))
        .unwrap();

    println!("Buy order status after partial fill: {:?}", {
        let users_view = exchange.get_user(alice).unwrap();
        users_view
            .get_active_orders(TradingPair::BtcUsdt, OrderSide::Buy)
            .iter()
            .find(|o| o.id == buy.id)
            .map(|o| o.status)
    });
    println!("Sell order status: {:?}", sell.status);

    let alice_user = exchange.get_user(alice).unwrap();
    println!(
        "Alice locked USDT: {}, available USDT: {}",
        alice_user.get_locked_balance(Asset::Usdt),
        alice_user.get_available_balance(Asset::Usdt)
    );
}
