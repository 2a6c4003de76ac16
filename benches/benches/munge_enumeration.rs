//! Search Driver Enumeration Benchmark
//!
//! Measures raw enumeration speed of the lazy search drivers (no scoring):
//! how fast each driver can walk its candidate space and hand back
//! `Sequence` values.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mungelab_core::registry::TransformRegistry;
use mungelab_core::search::bestfit::BestFitIterator;
use mungelab_core::search::munge::MungeIterator;
use std::hint::black_box;

fn bench_munge(c: &mut Criterion) {
    let registry = TransformRegistry::bootstrap();
    let pool: Vec<u8> = registry.iterate().map(|t| t.id).collect();

    let mut group = c.benchmark_group("munge-enumeration-by-level");
    for level in [1usize, 2, 3] {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| black_box(MungeIterator::new(&pool, level, 1).count()));
        });
    }
    group.finish();
}

fn bench_bestfit(c: &mut Criterion) {
    let registry = TransformRegistry::bootstrap();
    let all_ids: Vec<u8> = registry.iterate().map(|t| t.id).collect();

    let mut group = c.benchmark_group("bestfit-enumeration-by-set-size");
    for set_size in [3usize, 4, 5] {
        let pool = &all_ids[..set_size.min(all_ids.len())];
        group.bench_with_input(BenchmarkId::from_parameter(set_size), pool, |b, pool| {
            b.iter(|| black_box(BestFitIterator::new(pool, 1).count()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_munge, bench_bestfit);
criterion_main!(benches);
