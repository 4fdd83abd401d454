//! Benchmarks for beat quantization.

use std::hint::black_box;
use std::sync::Arc;

use criterion::Criterion;
use beatsynth::rhythm;
use beatsynth::sequencing::{PatternClock, RhythmPattern, Tempo};

pub fn bench_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/clock");
    let tempo = Tempo::from_bpm(120.0).expect("valid tempo");

    let backbeat = PatternClock::new(Arc::new(RhythmPattern::backbeat()), tempo);
    group.bench_function("backbeat", |b| {
        b.iter(|| black_box(backbeat.compute_due_events(black_box(1234.567))))
    });

    // Dense subdivisions: sixteen slots per beat
    let dense = rhythm![[
        hh, hh, sd, hh, hh, hh, sd, hh, hh, hh, sd, hh, hh, hh, sd, hh
    ]]
    .expect("valid pattern");
    let dense = PatternClock::new(Arc::new(dense), tempo);
    group.bench_function("sixteenths", |b| {
        b.iter(|| black_box(dense.compute_due_events(black_box(1234.567))))
    });

    group.finish();
}
