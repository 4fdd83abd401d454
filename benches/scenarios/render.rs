//! Benchmarks for rendering a playing beat synth.
//!
//! Mirrors what the player's audio callback does per block: run the
//! scheduler up to the block end, then render the graph.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use beatsynth::{
    engine::Scheduler,
    graph::{AudioContext, AudioEnv},
    io::{LocalSync, SyncProvider},
    synth::{kit, BeatSynth},
    BeatSynthConfig,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    for &size in BLOCK_SIZES {
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = AudioContext::new(SAMPLE_RATE);
        let bank = kit::default_bank(SAMPLE_RATE, &mut rng);
        // Fast tempo, nothing dropped: worst case for source churn
        let config = BeatSynthConfig::default()
            .with_bpm(240.0)
            .with_drop_probability(0.0)
            .with_seed(1);
        let sync = LocalSync;
        let synth = BeatSynth::new(ctx.clone(), sync, bank, &config).expect("valid synth");

        let mut scheduler = Scheduler::new();
        scheduler.add(synth, sync.sync_time(ctx.current_time()));
        let mut buffer = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("backbeat", size), &size, |b, _| {
            b.iter(|| {
                let block_end = (ctx.frame() + size as u64) as f64 / SAMPLE_RATE as f64;
                scheduler.run_before(sync.sync_time(block_end));
                ctx.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
