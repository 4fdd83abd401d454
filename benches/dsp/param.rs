//! Benchmarks for parameter automation sampling.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use beatsynth::graph::AudioParam;

use crate::BLOCK_SIZES;

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/param");

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];

        // Nothing scheduled: the fast path
        let steady = AudioParam::new(0.8);
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| steady.fill(black_box(0.0), 48_000.0, black_box(&mut out)))
        });

        // Mid-ramp: per-sample interpolation
        let mut ramp = AudioParam::new(1.0);
        ramp.set_value_at_time(1.0, 0.0);
        ramp.linear_ramp_to_value_at_time(0.0, 1.0);
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| ramp.fill(black_box(0.5), 48_000.0, black_box(&mut out)))
        });
    }

    group.finish();
}
