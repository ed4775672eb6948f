//! Benchmark suite for frame decoding and body-composition estimation.
//!
//! Isolates the pure decode/estimate path from async runtime overhead.

use bodyscale_listener::{
    ActivityClass, BodyCompositionEstimator, FrameLayout, InfluxDbFormatter, OutputFormatter,
    ScaleReading, Sex, UserProfile, decode,
};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

const ADVERTISEMENT: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x01, 0xF4, 0x00, 0x00, 0x00, 0x58, 0x1B, 0x00, 0x00, 0x00, 0x00, 0x01,
];

const HISTORIC: [u8; 17] = [
    0x1D, 0x02, 0x00, 0x65, 0x92, 0x00, 0x80, 0x80, 0x01, 0x11, 0x70, 0x00, 0x00, 0x00, 0x00, 0x01,
    0xF4,
];

fn estimator(sex: Sex) -> BodyCompositionEstimator {
    BodyCompositionEstimator::new(UserProfile::new(sex, 38, 171.0, ActivityClass::Medium).unwrap())
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("advertisement", |b| {
        b.iter(|| decode(FrameLayout::Advertisement, black_box(&ADVERTISEMENT)))
    });
    group.bench_function("historic", |b| {
        b.iter(|| decode(FrameLayout::Notification, black_box(&HISTORIC)))
    });

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    group.throughput(Throughput::Elements(1));

    for sex in [Sex::Female, Sex::Male] {
        let est = estimator(sex);
        group.bench_function(sex.to_string(), |b| {
            b.iter(|| est.estimate(black_box(70.0), black_box(500)))
        });
    }

    group.finish();
}

/// Decode, estimate and format one advertisement end to end
fn bench_reading_to_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading_to_line");
    group.throughput(Throughput::Elements(1));

    let est = estimator(Sex::Male);
    let formatter = InfluxDbFormatter::new("body_scale".to_string());
    group.bench_function("advertisement", |b| {
        b.iter(|| {
            let reading =
                ScaleReading::from_payload(FrameLayout::Advertisement, black_box(&ADVERTISEMENT), Some(&est))
                    .unwrap();
            black_box(formatter.format(&reading))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_estimate, bench_reading_to_line);
criterion_main!(benches);
