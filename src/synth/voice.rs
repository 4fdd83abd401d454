use std::collections::BTreeMap;

use crate::error::{BeatError, Result};
use crate::graph::AudioBuffer;
use crate::sequencing::{RhythmPattern, Voice};

/// Where a voice's sources enter the timbre chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Through the resonant low-pass, then the output gain
    Filtered,
    /// Straight into the output gain
    Direct,
}

/// Routing used when a voice is registered without an explicit route
pub const DEFAULT_ROUTES: &[(Voice, Route)] = &[
    (Voice::HiHat, Route::Filtered),
    (Voice::Snare, Route::Direct),
];

impl Route {
    pub fn default_for(voice: Voice) -> Route {
        DEFAULT_ROUTES
            .iter()
            .find(|(v, _)| *v == voice)
            .map(|(_, route)| *route)
            .unwrap_or(Route::Direct)
    }
}

/// Buffer and routing of one voice
#[derive(Debug, Clone)]
pub struct VoiceEntry {
    pub buffer: AudioBuffer,
    pub route: Route,
}

/// Read-only mapping from voice to sample buffer and route
///
/// Buffers are shared, never copied: every source node a dispatch creates
/// plays the same samples.
#[derive(Debug, Clone, Default)]
pub struct VoiceBank {
    entries: BTreeMap<Voice, VoiceEntry>,
}

impl VoiceBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `buffer` for `voice` with its default route
    pub fn with(self, voice: Voice, buffer: AudioBuffer) -> Self {
        self.with_route(voice, buffer, Route::default_for(voice))
    }

    pub fn with_route(mut self, voice: Voice, buffer: AudioBuffer, route: Route) -> Self {
        self.insert(voice, buffer, route);
        self
    }

    /// Returns the entry previously registered for `voice`
    pub fn insert(&mut self, voice: Voice, buffer: AudioBuffer, route: Route) -> Option<VoiceEntry> {
        self.entries.insert(voice, VoiceEntry { buffer, route })
    }

    pub fn get(&self, voice: Voice) -> Option<&VoiceEntry> {
        self.entries.get(&voice)
    }

    pub fn contains(&self, voice: Voice) -> bool {
        self.entries.contains_key(&voice)
    }

    pub fn voices(&self) -> impl Iterator<Item = Voice> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every voice the pattern triggers must have a buffer
    pub fn validate(&self, pattern: &RhythmPattern) -> Result<()> {
        match pattern.voices().into_iter().find(|voice| !self.contains(*voice)) {
            Some(voice) => Err(BeatError::MissingVoiceBuffer(voice)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm;

    fn buffer() -> AudioBuffer {
        AudioBuffer::new(vec![0.0; 8], 48_000.0)
    }

    #[test]
    fn test_default_routes() {
        assert_eq!(Route::default_for(Voice::HiHat), Route::Filtered);
        assert_eq!(Route::default_for(Voice::Snare), Route::Direct);
    }

    #[test]
    fn test_bank_uses_default_route_unless_overridden() {
        let bank = VoiceBank::new()
            .with(Voice::HiHat, buffer())
            .with_route(Voice::Snare, buffer(), Route::Filtered);

        assert_eq!(bank.get(Voice::HiHat).map(|e| e.route), Some(Route::Filtered));
        assert_eq!(bank.get(Voice::Snare).map(|e| e.route), Some(Route::Filtered));
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn test_validate_reports_missing_voice() {
        let pattern = rhythm![[hh, sd], [sd, _]].unwrap();
        let bank = VoiceBank::new().with(Voice::HiHat, buffer());

        assert_eq!(
            bank.validate(&pattern),
            Err(BeatError::MissingVoiceBuffer(Voice::Snare))
        );
        assert!(bank.with(Voice::Snare, buffer()).validate(&pattern).is_ok());
    }

    #[test]
    fn test_unused_voices_are_fine() {
        let pattern = rhythm![[hh, _]].unwrap();
        let bank = VoiceBank::new().with(Voice::HiHat, buffer());
        assert!(bank.validate(&pattern).is_ok());
    }

    #[test]
    fn test_buffers_are_shared() {
        let samples = buffer();
        let bank = VoiceBank::new().with(Voice::HiHat, samples.clone());
        assert!(bank.get(Voice::HiHat).is_some_and(|e| e.buffer.ptr_eq(&samples)));
    }
}
