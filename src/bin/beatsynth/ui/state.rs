//! Shared state types for UI communication
//!
//! Static data is handed over once before the stream starts; per-callback
//! updates are `Copy` so the audio thread never allocates for the UI.

use beatsynth::sequencing::RhythmPattern;

/// Static state known before playback starts
#[derive(Clone)]
pub struct UiStateInit {
    pub bpm: f64,
    pub sample_rate: f32,
    pub pattern: RhythmPattern,
}

/// Snapshot pushed from the audio callback
#[derive(Clone, Copy, Debug, Default)]
pub struct UiState {
    /// Audio time at the end of the last rendered callback
    pub time: f64,
    pub beat: i64,
    /// Bar of the pattern playing now
    pub bar: usize,
    pub cutoff_hz: f32,
    pub gain: f32,
    pub scheduled: u64,
    pub dropped: u64,
    /// Fading out after a stop request
    pub releasing: bool,
    /// The synth has retired from the scheduler
    pub finished: bool,
}
