//! Benchmarks for batch slicing and reshuffling
//!
//! Run with: cargo bench --package data-loader

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{Rating, RatingIter};

fn synthetic_ratings(n: u32) -> Vec<Rating> {
    (0..n)
        .map(|i| Rating::new(i % 943 + 1, i % 1682 + 1, (i % 5 + 1) as f32))
        .collect()
}

fn bench_batches(c: &mut Criterion) {
    let iter = RatingIter::new(synthetic_ratings(80_000), 64)
        .expect("non-zero batch size")
        .with_seed(0);

    c.bench_function("slice_epoch_batches", |b| {
        b.iter(|| {
            let total: usize = iter.batches().map(|batch| black_box(batch).len()).sum();
            black_box(total)
        })
    });
}

fn bench_reset(c: &mut Criterion) {
    let mut iter = RatingIter::new(synthetic_ratings(80_000), 64)
        .expect("non-zero batch size")
        .with_seed(0);

    c.bench_function("reshuffle_epoch", |b| b.iter(|| iter.reset()));
}

criterion_group!(benches, bench_batches, bench_reset);
criterion_main!(benches);
