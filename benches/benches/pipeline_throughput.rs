//! Pipeline Throughput Benchmark
//!
//! Measures encrypt/decrypt throughput across input sizes and sequence
//! lengths.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mungelab_core::pipeline::Pipeline;
use mungelab_core::registry::TransformRegistry;
use mungelab_core::sequence::Sequence;
use rand::prelude::*;
use std::hint::black_box;

const KB: usize = 1024;

fn bench_encrypt_by_size(c: &mut Criterion) {
    let registry = TransformRegistry::bootstrap();
    let pipeline = Pipeline::new(&registry);
    let sequence = Sequence::new(vec![(1, 1), (4, 2), (15, 1), (11, 1)], 2).unwrap();

    let mut group = c.benchmark_group("pipeline-encrypt-by-size");
    for size in [KB, 16 * KB, 256 * KB] {
        let mut input = vec![0u8; size];
        rand::rng().fill(&mut input[..]);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, data| {
            b.iter(|| black_box(pipeline.encrypt(&sequence, b"hunter2", [3u8; 8], black_box(data)).unwrap()));
        });
    }
    group.finish();
}

fn bench_encrypt_by_sequence_length(c: &mut Criterion) {
    let registry = TransformRegistry::bootstrap();
    let pipeline = Pipeline::new(&registry);
    let input = vec![0u8; 64 * KB];

    let mut group = c.benchmark_group("pipeline-encrypt-by-sequence-length");
    group.throughput(Throughput::Bytes(input.len() as u64));
    for len in [1usize, 2, 4, 8] {
        let steps: Vec<(u8, u32)> = (1..=len as u8).map(|id| (((id - 1) % 24) + 1, 1)).collect();
        let sequence = Sequence::new(steps, 1).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &sequence, |b, seq| {
            b.iter(|| black_box(pipeline.encrypt(seq, b"hunter2", [5u8; 8], black_box(&input)).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encrypt_by_size, bench_encrypt_by_sequence_length);
criterion_main!(benches);
