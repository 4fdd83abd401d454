//! Benchmarks for the resonant low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use beatsynth::dsp::SVFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Mild resonance
        let mut filter = SVFilter::lowpass(1000.0, 0.707);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(48_000.0));
            })
        });

        // The synth's default Q
        let mut filter = SVFilter::lowpass(1500.0, 16.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_q16", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(48_000.0));
            })
        });

        // Cutoff moving every block, as when the cutoff control is swept
        let mut filter = SVFilter::lowpass(1500.0, 16.0);
        let mut buffer = input.clone();
        let mut cutoff = 1500.0f32;
        group.bench_with_input(BenchmarkId::new("lowpass_sweep", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 20_000.0 { 1500.0 } else { cutoff * 1.01 };
                filter.set_cutoff(cutoff);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(48_000.0));
            })
        });
    }

    group.finish();
}
