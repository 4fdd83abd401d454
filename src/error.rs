//! Error types for configuration and parameter changes.
//!
//! Only programmer and configuration mistakes surface here. Late or
//! out-of-order scheduler calls are not errors: the clock recomputes
//! everything from absolute time.

use thiserror::Error;

use crate::sequencing::Voice;

/// Errors raised while building or controlling a beat synth.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeatError {
    /// Tempo was zero, negative or not finite
    #[error("tempo must be a positive, finite number of beats per minute, got {0}")]
    InvalidTempo(f64),

    /// Rhythm pattern has no bars
    #[error("rhythm pattern must contain at least one bar")]
    EmptyPattern,

    /// A bar has no slots, so its subdivision is undefined
    #[error("bar {index} has no slots; use a rest for a silent beat")]
    EmptyBar {
        /// Position of the empty bar in the pattern.
        index: usize,
    },

    /// The pattern references a voice the voice bank has no buffer for
    #[error("no buffer registered for voice '{0}'")]
    MissingVoiceBuffer(Voice),

    /// Voice label could not be parsed
    #[error("unknown voice label '{0}'")]
    UnknownVoice(String),

    /// Cutoff position outside [0, 1]
    #[error("cutoff position must lie in [0, 1], got {0}")]
    CutoffOutOfRange(f64),

    /// Cutoff bounds unusable for the exponential sweep
    #[error("invalid cutoff bounds: min {min} Hz, max {max} Hz (need 0 < min <= max)")]
    InvalidCutoffBounds {
        /// Lower bound in Hz.
        min: f64,
        /// Upper bound in Hz.
        max: f64,
    },

    /// Drop probability outside [0, 1]
    #[error("drop probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    /// A duration was negative or not finite
    #[error("{name} must be a non-negative, finite number of seconds, got {value}")]
    InvalidDuration {
        /// Which duration was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A gain value or multiplier was not finite
    #[error("gain must be finite, got {0}")]
    InvalidGain(f64),

    /// Filter resonance was zero, negative or not finite
    #[error("filter Q must be positive and finite, got {0}")]
    InvalidQ(f64),
}

impl BeatError {
    /// Validate a duration in seconds.
    pub(crate) fn check_duration(name: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(BeatError::InvalidDuration { name, value })
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BeatError>;
