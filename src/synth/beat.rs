/*
Beat Synth
==========

The time engine tying the pieces together:

    Scheduler ──advance_time(now)──→ BeatSynth
                                       │
                                       ├─ PatternClock: which slots fire in the next beat
                                       ├─ EventDispatcher: drop or schedule each one
                                       └─ returns the next beat boundary

Each call schedules exactly one beat ahead of `now`, so sources are always
created before they are due and the audio layer starts them on their exact
frame.

Lifecycle:
----------

    Active ──stop(release)──→ Releasing { until } ──now >= until──→ Finished

While releasing the synth keeps scheduling (those clicks fade with the output
gain). Once the fade is complete it answers `None` and the scheduler drops it.
Events already handed to the audio layer are never retracted.
*/

use std::sync::Arc;

use super::dispatch::{DispatchStats, EventDispatcher};
use super::message::{ControlMessage, MessageReceiver};
use super::timbre::TimbreChain;
use super::voice::VoiceBank;
use crate::config::BeatSynthConfig;
use crate::engine::TimeEngine;
use crate::error::Result;
use crate::graph::AudioEnv;
use crate::io::SyncProvider;
use crate::sequencing::{DueEvents, PatternClock};

/// Where a synth is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthState {
    Active,
    /// Output is fading; `until` is the audio time it reaches zero
    Releasing { until: f64 },
    Finished,
}

/// A rhythmic pattern player driven by a pull-based scheduler
pub struct BeatSynth<E: AudioEnv, S: SyncProvider> {
    clock: PatternClock,
    chain: TimbreChain<E>,
    dispatcher: EventDispatcher<E, S>,
    state: SynthState,
}

impl<E: AudioEnv + Clone, S: SyncProvider> BeatSynth<E, S> {
    /// Validate the configuration, check every pattern voice has a buffer and
    /// connect the timbre chain to `env`
    pub fn new(env: E, sync: S, voices: VoiceBank, config: &BeatSynthConfig) -> Result<Self> {
        let resolved = config.validate(env.sample_rate())?;
        voices.validate(&config.pattern)?;

        let chain = TimbreChain::new(env.clone(), &resolved);
        let dispatcher = EventDispatcher::new(env, sync, voices, chain.targets(), &resolved)?;
        let clock = PatternClock::new(Arc::new(config.pattern.clone()), resolved.tempo);

        tracing::info!(
            bpm = resolved.tempo.bpm(),
            bars = config.pattern.len(),
            drop_probability = resolved.drop_probability,
            seeded = resolved.seed.is_some(),
            "beat synth ready"
        );

        Ok(Self {
            clock,
            chain,
            dispatcher,
            state: SynthState::Active,
        })
    }
}

impl<E: AudioEnv, S: SyncProvider> BeatSynth<E, S> {
    pub fn clock(&self) -> &PatternClock {
        &self.clock
    }

    pub fn chain(&self) -> &TimbreChain<E> {
        &self.chain
    }

    pub fn state(&self) -> SynthState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SynthState::Finished
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Converts between the audio clock and the logical time this synth runs on
    pub fn sync(&self) -> &S {
        self.dispatcher.sync()
    }

    pub fn set_cutoff(&mut self, position: f64) -> Result<()> {
        self.chain.set_cutoff(position)
    }

    pub fn set_gain(&mut self, value: f64) -> Result<()> {
        self.chain.set_gain(value)
    }

    pub fn set_gain_multiplier(&mut self, multiplier: f64) -> Result<()> {
        self.chain.set_gain_multiplier(multiplier)
    }

    /// Fade out over `release_time` seconds, then retire from the scheduler
    pub fn stop(&mut self, release_time: f64) -> Result<()> {
        let until = self.chain.stop(release_time)?;
        if self.state != SynthState::Finished {
            self.state = SynthState::Releasing { until };
        }
        tracing::info!(release_time, until, "beat synth releasing");
        Ok(())
    }

    pub fn apply(&mut self, message: ControlMessage) -> Result<()> {
        match message {
            ControlMessage::SetCutoff(position) => self.set_cutoff(position),
            ControlMessage::SetGain(value) => self.set_gain(value),
            ControlMessage::SetGainMultiplier(multiplier) => self.set_gain_multiplier(multiplier),
            ControlMessage::Stop { release } => self.stop(release),
        }
    }

    /// Apply every pending message. Rejected messages are logged and skipped.
    pub fn drain<R: MessageReceiver + ?Sized>(&mut self, receiver: &mut R) -> usize {
        let mut applied = 0;
        while let Some(message) = receiver.pop() {
            match self.apply(message) {
                Ok(()) => applied += 1,
                Err(err) => tracing::warn!(?message, %err, "control message rejected"),
            }
        }
        applied
    }

    /// Schedule the beat after `now` and return what the clock produced
    pub fn schedule_beat(&mut self, now: f64) -> DueEvents {
        let due = self.clock.compute_due_events(now);

        for event in &due.events {
            if let Err(err) = self.dispatcher.dispatch(event.time, event.voice) {
                tracing::warn!(voice = %event.voice, time = event.time, %err, "dispatch failed");
            }
        }

        due
    }
}

impl<E: AudioEnv, S: SyncProvider> TimeEngine for BeatSynth<E, S> {
    fn advance_time(&mut self, now: f64) -> Option<f64> {
        if let SynthState::Releasing { until } = self.state {
            if now >= self.dispatcher.sync().sync_time(until) {
                self.state = SynthState::Finished;
                tracing::info!(now, "beat synth finished");
            }
        }

        if self.state == SynthState::Finished {
            return None;
        }

        if !self.clock.in_range(now) {
            tracing::error!(now, max_time = self.clock.max_time(), "time outside the beat grid, stopping");
            self.state = SynthState::Finished;
            return None;
        }

        Some(self.schedule_beat(now).next_wake)
    }
}
