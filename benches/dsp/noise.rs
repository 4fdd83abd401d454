//! Benchmarks for noise buffer generation.

use std::hint::black_box;

use criterion::Criterion;
use rand::{rngs::StdRng, SeedableRng};
use beatsynth::dsp::NoiseSource;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    let mut rng = StdRng::seed_from_u64(0);

    // One second at 48kHz, the size used for a full noise buffer
    let source = NoiseSource::one_second(48_000.0);
    group.bench_function("one_second", |b| {
        b.iter(|| black_box(source.render(&mut rng)))
    });

    group.bench_function("one_second_bipolar", |b| {
        b.iter(|| black_box(source.render_bipolar(&mut rng)))
    });

    group.finish();
}
