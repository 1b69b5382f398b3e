//! Feature extraction benchmarks
//!
//! Run with: cargo bench --package feature-engine

use beat_detector::BeatDetector;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use feature_engine::{nonlinear, FeatureConfig, FeatureExtractor};
use signal_core::synthetic;
use std::time::Duration;

fn bench_full_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Feature Extraction");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for &secs in &[5.0, 10.0] {
        let signal = synthetic::pulse_train(500, secs, 72.0).unwrap();
        let beats = BeatDetector::default().detect(&signal);
        let extractor = FeatureExtractor::new(FeatureConfig::default());

        group.throughput(Throughput::Elements(signal.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("extract", format!("{}s@500Hz", secs)),
            &(signal, beats),
            |b, (signal, beats)| b.iter(|| extractor.extract(black_box(signal), black_box(beats))),
        );
    }
    group.finish();
}

fn bench_nonlinear(c: &mut Criterion) {
    let signal = synthetic::pulse_train(500, 10.0, 72.0).unwrap();
    let values = signal.samples().to_vec();

    let mut group = c.benchmark_group("Nonlinear");
    group.sample_size(20);
    group.bench_function("dfa", |b| b.iter(|| nonlinear::dfa(black_box(&values))));
    group.bench_function("rqa_2000", |b| {
        b.iter(|| nonlinear::rqa(black_box(&values[..2000])))
    });
    group.finish();
}

criterion_group!(benches, bench_full_extraction, bench_nonlinear);
criterion_main!(benches);
