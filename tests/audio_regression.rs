use rand::{rngs::StdRng, SeedableRng};

use beatsynth::{
    engine::Scheduler,
    graph::{AudioBuffer, AudioContext, AudioEnv},
    io::{LocalSync, OffsetSync, SyncProvider},
    rhythm,
    sequencing::Voice,
    synth::{kit, BeatSynth, SynthState, VoiceBank},
    BeatSynthConfig, MAX_BLOCK_SIZE,
};

const SAMPLE_RATE: f32 = 48_000.0;

/// Drive the scheduler and the graph the way an audio callback does:
/// everything due before the block ends (in logical time) is scheduled,
/// then the block is rendered
fn render_seconds<E, S>(
    ctx: &AudioContext,
    scheduler: &mut Scheduler<BeatSynth<E, S>>,
    sync: &S,
    seconds: f64,
) -> Vec<f32>
where
    E: AudioEnv,
    S: SyncProvider,
{
    let frames = (seconds * SAMPLE_RATE as f64) as usize;
    let mut out = vec![0.0f32; frames];
    for block in out.chunks_mut(512) {
        let block_end = (ctx.frame() + block.len() as u64) as f64 / SAMPLE_RATE as f64;
        scheduler.run_before(sync.sync_time(block_end));
        ctx.render(block);
    }
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn kit_synth(config: &BeatSynthConfig) -> (AudioContext, BeatSynth<AudioContext, LocalSync>) {
    let ctx = AudioContext::new(SAMPLE_RATE);
    let mut rng = StdRng::seed_from_u64(5);
    let bank = kit::default_bank(SAMPLE_RATE, &mut rng);
    let synth = BeatSynth::new(ctx.clone(), LocalSync, bank, config).unwrap();
    (ctx, synth)
}

#[test]
fn renders_pattern_non_silent_and_bounded() {
    let config = BeatSynthConfig::default().with_seed(3).with_gain_multiplier(0.5);
    let (ctx, mut synth) = kit_synth(&config);
    synth.set_gain(1.0).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.add(synth, 0.0);
    let out = render_seconds(&ctx, &mut scheduler, &LocalSync, 4.0);

    assert!(out.iter().all(|s| s.is_finite()));
    assert!(peak(&out) > 0.05, "peak {}", peak(&out));
    // Q = 16 resonance can lift the hi-hat well above its buffer peak
    assert!(peak(&out) < 20.0, "peak {}", peak(&out));
    // Nothing is scheduled before the first beat boundary
    assert_eq!(peak(&out[..(0.5 * SAMPLE_RATE) as usize]), 0.0);
}

#[test]
fn clicks_land_on_the_grid() {
    // Constant buffers make onsets easy to find
    let bank = VoiceBank::new()
        .with(Voice::HiHat, AudioBuffer::new(vec![0.5; 4800], SAMPLE_RATE))
        .with(Voice::Snare, AudioBuffer::new(vec![0.5; 4800], SAMPLE_RATE));
    let config = BeatSynthConfig::new(rhythm![[sd, _]].unwrap()).with_drop_probability(0.0);
    let ctx = AudioContext::new(SAMPLE_RATE);
    let synth = BeatSynth::new(ctx.clone(), LocalSync, bank, &config).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.add(synth, 0.0);
    let out = render_seconds(&ctx, &mut scheduler, &LocalSync, 2.2);

    // Snare is routed straight to the output gain: exact onsets every 0.5 s
    for beat in 1..4 {
        let onset = (beat as f32 * 0.5 * SAMPLE_RATE) as usize;
        assert_eq!(out[onset - 1], 0.0, "beat {beat}");
        assert!((out[onset] - 0.5).abs() < 1e-6, "beat {beat}");
        // Click length is attack + release = 99 ms
        let end = onset + (0.099 * SAMPLE_RATE) as usize;
        assert!((out[end - 3] - 0.5).abs() < 1e-6, "beat {beat}");
        assert_eq!(out[end + 3], 0.0, "beat {beat}");
    }
}

#[test]
fn sources_are_disposed_after_stop() {
    let config = BeatSynthConfig::default().with_drop_probability(0.0).with_seed(1);
    let (ctx, synth) = kit_synth(&config);

    let mut scheduler = Scheduler::new();
    scheduler.add(synth, 0.0);

    render_seconds(&ctx, &mut scheduler, &LocalSync, 3.0);
    // Only the beat scheduled ahead can still be alive
    assert!(ctx.active_sources() <= 2, "{} sources alive", ctx.active_sources());

    // Nodes do not pile up over a long render
    render_seconds(&ctx, &mut scheduler, &LocalSync, 30.0);
    assert!(ctx.node_count() <= 6, "{} nodes alive", ctx.node_count());
}

#[test]
fn released_synth_goes_silent_and_retires() {
    let config = BeatSynthConfig::default().with_drop_probability(0.0).with_seed(2);
    let (ctx, synth) = kit_synth(&config);

    let mut scheduler = Scheduler::new();
    let id = scheduler.add(synth, 0.0);
    render_seconds(&ctx, &mut scheduler, &LocalSync, 1.0);

    if let Some(synth) = scheduler.get_mut(id) {
        synth.stop(0.5).unwrap();
        assert!(matches!(synth.state(), SynthState::Releasing { .. }));
    }

    // Fade, then well past it
    render_seconds(&ctx, &mut scheduler, &LocalSync, 0.6);
    assert!(!scheduler.contains(id));

    let tail = render_seconds(&ctx, &mut scheduler, &LocalSync, 1.0);
    assert_eq!(peak(&tail), 0.0);
}

#[test]
fn offset_sync_shifts_audio_times() {
    let bank = VoiceBank::new()
        .with(Voice::HiHat, AudioBuffer::new(vec![0.5; 480], SAMPLE_RATE))
        .with(Voice::Snare, AudioBuffer::new(vec![0.5; 480], SAMPLE_RATE));
    let config = BeatSynthConfig::new(rhythm![[sd]].unwrap()).with_drop_probability(0.0);
    let ctx = AudioContext::new(SAMPLE_RATE);

    // Logical zero sits 0.25 s into the audio clock
    let sync = OffsetSync::starting_at(0.25);
    let synth = BeatSynth::new(ctx.clone(), sync, bank, &config).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.add(synth, 0.0);
    let out = render_seconds(&ctx, &mut scheduler, &sync, 1.0);

    // Logical beat 0.5 is audio 0.75
    let onset = (0.75 * SAMPLE_RATE) as usize;
    assert_eq!(out[onset - 1], 0.0);
    assert!((out[onset] - 0.5).abs() < 1e-6);
}

#[test]
fn logical_time_ahead_of_audio_still_plays() {
    let bank = VoiceBank::new()
        .with(Voice::HiHat, AudioBuffer::new(vec![0.5; 480], SAMPLE_RATE))
        .with(Voice::Snare, AudioBuffer::new(vec![0.5; 480], SAMPLE_RATE));
    let config = BeatSynthConfig::new(rhythm![[sd]].unwrap()).with_drop_probability(0.0);
    let ctx = AudioContext::new(SAMPLE_RATE);

    // Logical time runs one second ahead of the audio clock
    let sync = OffsetSync::new(1.0);
    let synth = BeatSynth::new(ctx.clone(), sync, bank, &config).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.add(synth, sync.sync_time(ctx.current_time()));
    let out = render_seconds(&ctx, &mut scheduler, &sync, 3.0);

    // Logical 1.5 is audio 0.5, then every half second
    for onset in [0.5, 1.0, 1.5, 2.0] {
        let frame = (onset * SAMPLE_RATE as f64) as usize;
        assert_eq!(out[frame - 1], 0.0, "onset {onset}");
        assert!((out[frame] - 0.5).abs() < 1e-6, "onset {onset}");
    }
    assert_eq!(peak(&out[..(0.5 * SAMPLE_RATE) as usize]), 0.0);
}

#[test]
fn blocks_larger_than_max_block_size_render() {
    let (ctx, synth) = kit_synth(&BeatSynthConfig::default().with_seed(4));
    let mut scheduler = Scheduler::new();
    scheduler.add(synth, 0.0);
    scheduler.run_until(1.0);

    let mut out = vec![0.0f32; MAX_BLOCK_SIZE * 3 + 17];
    ctx.render(&mut out);
    assert_eq!(ctx.frame(), out.len() as u64);
}
