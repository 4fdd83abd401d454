//! Construction parameters for a [`BeatSynth`](crate::synth::BeatSynth).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BeatError, Result};
use crate::sequencing::{RhythmPattern, Tempo};

/// Probability that a due event is silently skipped
pub const DEFAULT_DROP_PROBABILITY: f64 = 0.3;
/// Source playback length before release, in seconds
pub const DEFAULT_CLICK_ATTACK: f64 = 0.001;
pub const DEFAULT_CLICK_RELEASE: f64 = 0.098;
/// Lowest cutoff reachable by the cutoff control, in Hz
pub const DEFAULT_MIN_CUTOFF: f64 = 1500.0;
pub const DEFAULT_FILTER_Q: f64 = 16.0;
/// Smoothing time of output gain changes, in seconds
pub const DEFAULT_GAIN_RAMP: f64 = 0.05;
pub const DEFAULT_GAIN_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_BPM: f64 = 120.0;

/// Everything needed to build a beat synth apart from its collaborators
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct BeatSynthConfig {
    pub bpm: f64,
    pub pattern: RhythmPattern,
    pub drop_probability: f64,
    pub click_attack: f64,
    pub click_release: f64,
    pub min_cutoff: f64,
    /// Upper cutoff bound in Hz; half the sample rate when unset
    pub max_cutoff: Option<f64>,
    pub filter_q: f64,
    pub gain_ramp: f64,
    pub gain_multiplier: f64,
    /// Seed for the drop decisions; entropy when unset
    pub seed: Option<u64>,
}

impl Default for BeatSynthConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            pattern: RhythmPattern::backbeat(),
            drop_probability: DEFAULT_DROP_PROBABILITY,
            click_attack: DEFAULT_CLICK_ATTACK,
            click_release: DEFAULT_CLICK_RELEASE,
            min_cutoff: DEFAULT_MIN_CUTOFF,
            max_cutoff: None,
            filter_q: DEFAULT_FILTER_Q,
            gain_ramp: DEFAULT_GAIN_RAMP,
            gain_multiplier: DEFAULT_GAIN_MULTIPLIER,
            seed: None,
        }
    }
}

/// Values of a [`BeatSynthConfig`] after validation against a sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConfig {
    pub tempo: Tempo,
    pub drop_probability: f64,
    pub click_attack: f64,
    pub click_release: f64,
    pub min_cutoff: f64,
    pub max_cutoff: f64,
    pub filter_q: f64,
    pub gain_ramp: f64,
    pub gain_multiplier: f64,
    pub seed: Option<u64>,
}

impl BeatSynthConfig {
    pub fn new(pattern: RhythmPattern) -> Self {
        Self {
            pattern,
            ..Self::default()
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_pattern(mut self, pattern: RhythmPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_drop_probability(mut self, probability: f64) -> Self {
        self.drop_probability = probability;
        self
    }

    pub fn with_click(mut self, attack: f64, release: f64) -> Self {
        self.click_attack = attack;
        self.click_release = release;
        self
    }

    pub fn with_cutoff_range(mut self, min: f64, max: f64) -> Self {
        self.min_cutoff = min;
        self.max_cutoff = Some(max);
        self
    }

    pub fn with_filter_q(mut self, q: f64) -> Self {
        self.filter_q = q;
        self
    }

    pub fn with_gain_ramp(mut self, seconds: f64) -> Self {
        self.gain_ramp = seconds;
        self
    }

    pub fn with_gain_multiplier(mut self, multiplier: f64) -> Self {
        self.gain_multiplier = multiplier;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every value and fill in sample-rate dependent defaults
    pub fn validate(&self, sample_rate: f32) -> Result<ResolvedConfig> {
        let tempo = Tempo::from_bpm(self.bpm)?;

        if !(0.0..=1.0).contains(&self.drop_probability) {
            return Err(BeatError::InvalidProbability(self.drop_probability));
        }

        let click_attack = BeatError::check_duration("click attack", self.click_attack)?;
        let click_release = BeatError::check_duration("click release", self.click_release)?;
        let gain_ramp = BeatError::check_duration("gain ramp", self.gain_ramp)?;

        let min_cutoff = self.min_cutoff;
        let max_cutoff = self.max_cutoff.unwrap_or(sample_rate as f64 / 2.0);
        if !(min_cutoff.is_finite() && max_cutoff.is_finite() && min_cutoff > 0.0 && min_cutoff <= max_cutoff) {
            return Err(BeatError::InvalidCutoffBounds {
                min: min_cutoff,
                max: max_cutoff,
            });
        }

        if !(self.filter_q.is_finite() && self.filter_q > 0.0) {
            return Err(BeatError::InvalidQ(self.filter_q));
        }
        if !self.gain_multiplier.is_finite() {
            return Err(BeatError::InvalidGain(self.gain_multiplier));
        }

        Ok(ResolvedConfig {
            tempo,
            drop_probability: self.drop_probability,
            click_attack,
            click_release,
            min_cutoff,
            max_cutoff,
            filter_q: self.filter_q,
            gain_ramp,
            gain_multiplier: self.gain_multiplier,
            seed: self.seed,
        })
    }
}
