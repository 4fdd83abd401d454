#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BeatError, Result};

/// Tempo of a playback session, fixed once playback starts
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
    beat_period: f64,
}

impl Tempo {
    /// Build a tempo from beats per minute
    pub fn from_bpm(bpm: f64) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(BeatError::InvalidTempo(bpm));
        }
        Ok(Self {
            bpm,
            beat_period: 60.0 / bpm,
        })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Seconds per beat
    pub fn beat_period(&self) -> f64 {
        self.beat_period
    }
}

impl TryFrom<f64> for Tempo {
    type Error = BeatError;

    fn try_from(bpm: f64) -> Result<Self> {
        Self::from_bpm(bpm)
    }
}

impl From<Tempo> for f64 {
    fn from(tempo: Tempo) -> Self {
        tempo.bpm
    }
}
