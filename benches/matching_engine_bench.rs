use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use exchange_core::{Asset, Exchange, OrderKind, OrderSide, TradingPair};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fresh_exchange() -> (Exchange, exchange_core::UserId, exchange_core::UserId) {
    let mut exchange = Exchange::new();
    let alice = exchange.create_user("alice", "alice@example.com").unwrap();
    let bob = exchange.create_user("bob", "bob@example.com").unwrap();
    exchange.deposit(alice, Asset::Usdt, dec!(1000000000)).unwrap();
    exchange.deposit(bob, Asset::Btc, dec!(1000000)).unwrap();
    (exchange, alice, bob)
}

// Simulates realistic exchange behavior with mixed order types: 70%
// limit, 30% market, with 10% of limit orders cancelled shortly after.
fn simulate_exchange_orders(exchange: &mut Exchange, alice: exchange_core::UserId, bob: exchange_core::UserId, order_count: usize) {
    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
    let mut order_ids = Vec::new();

    for i in 0..order_count {
        let (user, side) = if i % 2 == 0 { (alice, OrderSide::Buy) } else { (bob, OrderSide::Sell) };

        if i % 10 < 7 {
            let price_offset = Decimal::from((i % 10) as i64 - 5);
            let price = dec!(50000) + price_offset;
            let quantity = Decimal::from(((i % 5) + 1) as i64);

            if let Ok(order) = engine.place_order(user, side, OrderKind::Limit, Some(quantity), None, Some(price)) {
                order_ids.push(order.id);
            }

            if i % 10 == 0 && !order_ids.is_empty() {
                let idx = i % order_ids.len();
                engine.cancel_order(user, order_ids[idx]);
            }
        } else {
            let quantity = Decimal::from(((i % 3) + 1) as i64);
            let _ = engine.place_order(user, side, OrderKind::Market, Some(quantity), None, None);
        }
    }
}

fn bench_mixed_order_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("exchange_simulation");

    for order_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*order_count as u64));

        group.bench_with_input(format!("{}_orders", order_count), order_count, |b, &count| {
            b.iter(|| {
                let (mut exchange, alice, bob) = fresh_exchange();
                simulate_exchange_orders(black_box(&mut exchange), alice, bob, black_box(count));
            });
        });
    }

    group.finish();
}

fn bench_limit_order_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("limit_orders");

    group.bench_function("place_limit_order", |b| {
        let (mut exchange, alice, _bob) = fresh_exchange();
        let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
        let mut price = dec!(40000);

        b.iter(|| {
            price += dec!(0.01);
            engine
                .place_order(alice, OrderSide::Buy, OrderKind::Limit, black_box(Some(dec!(1))), None, black_box(Some(price)))
                .unwrap();
        });
    });

    group.finish();
}

fn bench_market_order_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_orders");

    group.bench_function("execute_market_order", |b| {
        b.iter_batched(
            || {
                let (mut exchange, alice, bob) = fresh_exchange();
                {
                    let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
                    for i in 0..10 {
                        engine
                            .place_order(
                                bob,
                                OrderSide::Sell,
                                OrderKind::Limit,
                                Some(dec!(10)),
                                None,
                                Some(dec!(50000) + Decimal::from(i)),
                            )
                            .unwrap();
                    }
                }
                (exchange, alice)
            },
            |(mut exchange, alice)| {
                let engine = exchange.get_trading_pair(TradingPair::BtcUsdt);
                engine
                    .place_order(alice, OrderSide::Buy, OrderKind::Market, black_box(Some(dec!(5))), None, None)
                    .unwrap();
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_mixed_order_throughput, bench_limit_order_placement, bench_market_order_execution);
criterion_main!(benches);
