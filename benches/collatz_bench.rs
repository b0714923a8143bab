//! Benchmarks for Collatz sequence statistics
//!
//! Measures performance of:
//! - Sequence length and peak value without storing the trajectory
//! - Full trajectory generation and analysis
//! - Range scans (batch and longest-in-range)

use collatz_stats::collatz::{RangeScanner, SequenceEngine, SilentObserver};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Starting numbers from small to large, including a few with long trajectories.
const INPUTS: [i64; 8] = [10, 50, 100, 500, 1000, 10_000, 77_031, 837_799];

fn bench_sequence_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_length");
    let engine = SequenceEngine::new();

    for &n in &INPUTS {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| engine.sequence_length(black_box(n)))
        });
    }
    group.finish();
}

fn bench_max_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_value");
    let engine = SequenceEngine::new();

    for &n in &INPUTS {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| engine.max_value(black_box(n)))
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let engine = SequenceEngine::new();

    for &n in &INPUTS {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| engine.generate(black_box(n)))
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let engine = SequenceEngine::new();

    for &n in &[27i64, 1000, 837_799] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| engine.analyze(black_box(n)))
        });
    }
    group.finish();
}

/// Range scans at increasing widths, starting from 1.
fn bench_batch_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_analyze");
    let scanner = RangeScanner::new(SequenceEngine::new(), &SilentObserver);

    for &width in &[100i64, 1000, 10_000] {
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("width", width), &width, |b, &width| {
            b.iter(|| scanner.batch_analyze(1, black_box(width)))
        });
    }
    group.finish();
}

fn bench_find_longest(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_longest");
    let scanner = RangeScanner::new(SequenceEngine::new(), &SilentObserver);

    for &width in &[100i64, 1000, 10_000] {
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("width", width), &width, |b, &width| {
            b.iter(|| scanner.find_longest(1, black_box(width)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequence_length,
    bench_max_value,
    bench_generate,
    bench_analyze,
    bench_batch_analyze,
    bench_find_longest,
);

criterion_main!(benches);
