//! Player - builds the synth, opens the output device and runs the UI

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rand::{rngs::StdRng, SeedableRng};
use rtrb::RingBuffer;

use beatsynth::{
    engine::Scheduler,
    graph::{AudioContext, AudioEnv},
    io::{LocalSync, SyncProvider},
    sequencing::RhythmPattern,
    synth::{kit, BeatSynth, ControlMessage, SynthState},
    BeatSynthConfig, MAX_BLOCK_SIZE,
};

use super::ui::{UiApp, UiState, UiStateInit};

/// Visualization samples buffered between the audio and UI threads
const VIS_RING_SIZE: usize = 8192;

/// Main application builder
pub struct Player {
    config: BeatSynthConfig,
    release: f64,
}

impl Player {
    pub fn new() -> Self {
        Self {
            config: BeatSynthConfig::default(),
            release: 0.5,
        }
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.bpm = bpm;
        self
    }

    pub fn pattern(mut self, pattern: RhythmPattern) -> Self {
        self.config.pattern = pattern;
        self
    }

    /// Fade-out time used when quitting
    pub fn release(mut self, seconds: f64) -> Self {
        self.release = seconds;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        tracing::info!(sample_rate, channels, bpm = self.config.bpm, "output device ready");

        let ctx = AudioContext::new(sample_rate);
        let mut rng = StdRng::from_entropy();
        let bank = kit::default_bank(sample_rate, &mut rng);
        let sync = LocalSync;
        let synth = BeatSynth::new(ctx.clone(), sync, bank, &self.config)
            .wrap_err("invalid synth configuration")?;

        let clock = synth.clock().clone();
        let gain_param = synth.chain().gain_param();
        let cutoff_param = synth.chain().cutoff_param();
        let initial_cutoff = synth.chain().cutoff();

        let mut scheduler = Scheduler::new();
        let id = scheduler.add(synth, sync.sync_time(ctx.current_time()));

        let (control_tx, mut control_rx) = RingBuffer::<ControlMessage>::new(64);
        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_RING_SIZE);
        let (mut state_tx, state_rx) = RingBuffer::<UiState>::new(16);

        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
        let audio_ctx = ctx.clone();

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                if let Some(synth) = scheduler.get_mut(id) {
                    synth.drain(&mut control_rx);
                }

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                    // Everything due before this block ends gets scheduled first.
                    // Engines run on logical time.
                    let block_end = (audio_ctx.frame() + frames as u64) as f64 / sample_rate as f64;
                    scheduler.run_before(sync.sync_time(block_end));

                    let block = &mut render_buf[..frames];
                    audio_ctx.render(block);

                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        // Visualization is best-effort: drop samples if the UI lags
                        let _ = audio_tx.push(s);
                    }

                    frames_written += frames;
                }

                let now = audio_ctx.current_time();
                let beat = clock.beat_number(sync.sync_time(now));
                let stats = scheduler.get(id).map(|synth| synth.stats());
                let _ = state_tx.push(UiState {
                    time: now,
                    beat,
                    bar: clock.pattern().bar_index(beat),
                    cutoff_hz: audio_ctx.value_at(cutoff_param, now),
                    gain: audio_ctx.value_at(gain_param, now),
                    scheduled: stats.map_or(0, |s| s.scheduled),
                    dropped: stats.map_or(0, |s| s.dropped),
                    releasing: scheduler
                        .get(id)
                        .is_some_and(|synth| synth.state() != SynthState::Active),
                    finished: !scheduler.contains(id),
                });
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let init = UiStateInit {
            bpm: self.config.bpm,
            sample_rate,
            pattern: self.config.pattern.clone(),
        };
        let mut ui = UiApp::new(audio_rx, state_rx, control_tx, init, initial_cutoff, self.release);

        let mut terminal = ratatui::init();
        let result = ui.run(&mut terminal);
        ratatui::restore();

        tracing::info!(frames = ctx.frame(), "player stopped");
        result
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
