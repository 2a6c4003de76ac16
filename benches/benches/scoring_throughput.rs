//! Scoring Throughput Benchmark
//!
//! Measures the nine-metric cryptanalysis engine end to end: running all
//! metrics against a candidate and its avalanche/key-dependency companions,
//! then aggregating under both scoring modes.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mungelab_core::analysis::{aggregate_score, run_all_metrics, AnalysisInputs, OperationMode, ScoringMode};
use rand::prelude::*;
use std::hint::black_box;

const KB: usize = 1024;

fn make_inputs(size: usize) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut ciphertext = vec![0u8; size];
    rand::rng().fill(&mut ciphertext[..]);
    let mut avalanche = ciphertext.clone();
    avalanche[0] ^= 1;
    let mut key_dependency = ciphertext.clone();
    key_dependency[size / 2] ^= 0x80;
    let plaintext = vec![0u8; size];
    (ciphertext, avalanche, key_dependency, plaintext)
}

fn bench_run_all_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("run-all-metrics");
    for size in [KB, 16 * KB, 256 * KB] {
        let (ciphertext, avalanche, key_dependency, plaintext) = make_inputs(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let inputs = AnalysisInputs {
                ciphertext: &ciphertext,
                avalanche_ciphertext: &avalanche,
                key_dependency_ciphertext: &key_dependency,
                original_plaintext: &plaintext,
            };
            b.iter(|| black_box(run_all_metrics(black_box(&inputs), OperationMode::None).unwrap()));
        });
    }
    group.finish();
}

fn bench_aggregate_score(c: &mut Criterion) {
    let (ciphertext, avalanche, key_dependency, plaintext) = make_inputs(64 * KB);
    let inputs = AnalysisInputs {
        ciphertext: &ciphertext,
        avalanche_ciphertext: &avalanche,
        key_dependency_ciphertext: &key_dependency,
        original_plaintext: &plaintext,
    };
    let results = run_all_metrics(&inputs, OperationMode::Cryptographic).unwrap();

    let mut group = c.benchmark_group("aggregate-score-by-mode");
    group.bench_function("practical", |b| {
        b.iter(|| black_box(aggregate_score(black_box(&results), ScoringMode::Practical, OperationMode::Cryptographic)));
    });
    group.bench_function("metric", |b| {
        b.iter(|| black_box(aggregate_score(black_box(&results), ScoringMode::Metric, OperationMode::Cryptographic)));
    });
    group.finish();
}

criterion_group!(benches, bench_run_all_metrics, bench_aggregate_score);
criterion_main!(benches);
