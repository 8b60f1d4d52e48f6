//! Benchmarks for reconciliation hot paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use order_reconciler::engine::{classify, DedupIndex};
use order_reconciler::{Notification, OrderStatus, PriceType, ReconciliationEngine};
use rust_decimal::Decimal;

fn create_update(order_id: u64, price: i64) -> Notification {
    Notification::new(order_id, PriceType::Limit, OrderStatus::Open)
        .with_price(Decimal::from(price), Decimal::from(price + 2))
        .with_symbol("TATA")
        .with_generated_at("17-10-2026 09:15:02")
}

fn benchmark_dedup_lookup(c: &mut Criterion) {
    let mut index = DedupIndex::new();
    for i in 0..100_000u64 {
        index.admit(&create_update(i, 100));
    }
    let seen = create_update(50_000, 100);
    let novel = create_update(50_000, 101);

    c.bench_function("dedup_lookup_hit_100k", |b| {
        b.iter(|| black_box(index.is_duplicate(black_box(&seen))))
    });

    c.bench_function("dedup_lookup_miss_100k", |b| {
        b.iter(|| black_box(index.is_duplicate(black_box(&novel))))
    });
}

fn benchmark_classify(c: &mut Criterion) {
    let prior = create_update(1, 100);
    let update = create_update(1, 101);

    c.bench_function("classify_modify", |b| {
        b.iter(|| black_box(classify(black_box(&update), Some(&prior))))
    });
}

fn benchmark_handle_stream(c: &mut Criterion) {
    // every update repeated once, and repriced every fourth
    let stream: Vec<Notification> = (0..5_000u64)
        .flat_map(|i| {
            let update = create_update(i % 1_000, 100 + (i / 4) as i64);
            [update.clone(), update]
        })
        .collect();

    c.bench_function("handle_10k_updates", |b| {
        b.iter(|| {
            let mut engine = ReconciliationEngine::new(95055780);
            for update in &stream {
                engine.handle(update.clone());
            }
            black_box(engine.stats())
        })
    });
}

criterion_group!(
    benches,
    benchmark_dedup_lookup,
    benchmark_classify,
    benchmark_handle_stream
);
criterion_main!(benches);
