use rand::{rngs::StdRng, Rng, SeedableRng};

use super::timbre::RouteTargets;
use super::voice::VoiceBank;
use crate::config::ResolvedConfig;
use crate::error::{BeatError, Result};
use crate::graph::{AudioEnv, NodeId};
use crate::io::SyncProvider;
use crate::sequencing::Voice;

/// Outcome of handing one due event to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// Skipped by the random drop filter
    Dropped,
    /// A source node was scheduled (times are audio time)
    Scheduled { node: NodeId, start: f64, stop: f64 },
}

/// Running totals of dispatch outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub scheduled: u64,
    pub dropped: u64,
}

impl DispatchStats {
    pub fn total(&self) -> u64 {
        self.scheduled + self.dropped
    }

    /// Fraction of events dropped so far (0 before any dispatch)
    pub fn drop_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.dropped as f64 / total as f64,
        }
    }
}

/// Turns due events into scheduled one-shot sources
///
/// Each dispatch either drops the event at random or creates a source node
/// for the voice's buffer, connects it where the voice is routed, and
/// schedules it to play a short click at the event's audio time.
pub struct EventDispatcher<E: AudioEnv, S: SyncProvider> {
    env: E,
    sync: S,
    voices: VoiceBank,
    targets: RouteTargets,
    rng: StdRng,
    drop_probability: f64,
    click_length: f64,
    stats: DispatchStats,
}

impl<E: AudioEnv, S: SyncProvider> EventDispatcher<E, S> {
    pub fn new(
        env: E,
        sync: S,
        voices: VoiceBank,
        targets: RouteTargets,
        config: &ResolvedConfig,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.drop_probability) {
            return Err(BeatError::InvalidProbability(config.drop_probability));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            env,
            sync,
            voices,
            targets,
            rng,
            drop_probability: config.drop_probability,
            click_length: config.click_attack + config.click_release,
            stats: DispatchStats::default(),
        })
    }

    /// Fire `voice` at logical time `event_time`, unless the drop filter skips it
    pub fn dispatch(&mut self, event_time: f64, voice: Voice) -> Result<Dispatch> {
        if self.rng.gen_bool(self.drop_probability) {
            self.stats.dropped += 1;
            tracing::debug!(%voice, event_time, "event dropped");
            return Ok(Dispatch::Dropped);
        }

        let entry = self
            .voices
            .get(voice)
            .ok_or(BeatError::MissingVoiceBuffer(voice))?;

        let start = self.sync.audio_time(event_time);
        let stop = start + self.click_length;

        let node = self.env.create_buffer_source(entry.buffer.clone());
        self.env.connect(node, self.targets.input(entry.route));
        self.env.start(node, start);
        self.env.stop(node, stop);

        self.stats.scheduled += 1;
        tracing::debug!(%voice, %node, route = ?entry.route, start, stop, "event scheduled");

        Ok(Dispatch::Scheduled { node, start, stop })
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn sync(&self) -> &S {
        &self.sync
    }

    pub fn voices(&self) -> &VoiceBank {
        &self.voices
    }

    pub fn drop_probability(&self) -> f64 {
        self.drop_probability
    }
}
