//! Benchmarks for metrics derivation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pulse_core::types::{Bar, Interval, TimeSeries};
use pulse_metrics::derive;

fn minute_series(n: usize) -> TimeSeries {
    let rows = (0..n)
        .map(|i| {
            let price = 40_000.0 + (i as f64 * 0.1).sin() * 500.0;
            Bar::new(i as i64 * 60_000, price, price + 10.0, price - 10.0, price, 1.0)
        })
        .collect();
    TimeSeries::new("BTC-USD", Interval::Minute1, rows)
}

fn bench_derive(c: &mut Criterion) {
    // One week of minute bars, the largest series a fetch returns.
    let series = minute_series(7 * 24 * 60);

    c.bench_function("derive_24h_minute_bars", |b| {
        b.iter(|| derive(black_box(&series)))
    });
}

criterion_group!(benches, bench_derive);
criterion_main!(benches);
