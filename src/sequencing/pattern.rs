/*
Rhythm Patterns
===============

A rhythm pattern is a short cyclic score. Each entry is a BAR, and a bar lasts
exactly one beat. The bar is split into equal SLOTS; every slot is either a
rest or a hit on one voice.

Example mental model (two-slot bars = eighth notes):

    [hh, sd]   hi-hat on the beat, snare on the "and"
    [sd, hh]   snare on the beat, hi-hat on the "and"
    [hh, _ ]   hi-hat on the beat, nothing on the "and"
    [hh, hh, hh]  a hi-hat triplet

Slot timing is implicit. For a bar of S slots the subdivision unit is
beat_period / S and slot i fires at beat_start + i * unit. Bars may have
different slot counts; each bar sets its own subdivision.

The pattern wraps. Beat n plays bar (n mod len), with Euclidean modulo so
negative beat numbers (time before the epoch) still land on a valid bar.

This module provides:
- `Slot` - a rest or a voice hit
- `Bar` - the slots of one beat
- `RhythmPattern` - the validated, immutable cycle of bars
- `rhythm!` - a compact macro for writing patterns
*/

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::voice::Voice;
use crate::error::{BeatError, Result};

/// A slot in a bar - silence or a hit on one voice
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Silence for this slot
    Rest,
    /// Trigger the voice at this slot's position
    Hit(Voice),
}

impl Slot {
    /// The voice this slot triggers, if any
    pub fn voice(self) -> Option<Voice> {
        match self {
            Slot::Hit(voice) => Some(voice),
            Slot::Rest => None,
        }
    }
}

impl From<Voice> for Slot {
    fn from(voice: Voice) -> Self {
        Slot::Hit(voice)
    }
}

impl TryFrom<String> for Slot {
    type Error = BeatError;

    fn try_from(value: String) -> Result<Self> {
        match value.trim() {
            "_" | "." | "" => Ok(Slot::Rest),
            label => label.parse().map(Slot::Hit),
        }
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Rest => "_".to_string(),
            Slot::Hit(voice) => voice.label().to_string(),
        }
    }
}

/// The slots of a single beat
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    slots: Vec<Slot>,
}

impl Bar {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots, i.e. the subdivision of this beat
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Non-rest slots as (slot index, voice), in slot order
    pub fn hits(&self) -> impl Iterator<Item = (usize, Voice)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.voice().map(|voice| (index, voice)))
    }
}

impl From<Vec<Slot>> for Bar {
    fn from(slots: Vec<Slot>) -> Self {
        Self::new(slots)
    }
}

/// An immutable cycle of bars, one bar per beat
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Bar>", into = "Vec<Bar>"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhythmPattern {
    bars: Vec<Bar>,
}

impl RhythmPattern {
    /// Build a pattern, rejecting an empty cycle or an empty bar
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(BeatError::EmptyPattern);
        }
        if let Some(index) = bars.iter().position(Bar::is_empty) {
            return Err(BeatError::EmptyBar { index });
        }
        Ok(Self { bars })
    }

    /// Four beats of alternating hi-hat/snare eighths
    pub fn backbeat() -> Self {
        use Slot::Hit;
        use Voice::{HiHat, Snare};

        let a = Bar::new(vec![Hit(HiHat), Hit(Snare)]);
        let b = Bar::new(vec![Hit(Snare), Hit(HiHat)]);
        Self {
            bars: vec![a.clone(), b.clone(), a, b],
        }
    }

    /// Number of bars (= beats) in one cycle
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: construction rejects empty patterns
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Position in the cycle for an absolute beat number
    pub fn bar_index(&self, beat: i64) -> usize {
        beat.rem_euclid(self.bars.len() as i64) as usize
    }

    /// The bar played on an absolute beat number
    pub fn bar(&self, beat: i64) -> &Bar {
        &self.bars[self.bar_index(beat)]
    }

    /// Every voice the pattern triggers at least once
    pub fn voices(&self) -> BTreeSet<Voice> {
        self.bars
            .iter()
            .flat_map(|bar| bar.hits().map(|(_, voice)| voice))
            .collect()
    }
}

impl Default for RhythmPattern {
    fn default() -> Self {
        Self::backbeat()
    }
}

impl TryFrom<Vec<Bar>> for RhythmPattern {
    type Error = BeatError;

    fn try_from(bars: Vec<Bar>) -> Result<Self> {
        Self::new(bars)
    }
}

impl From<RhythmPattern> for Vec<Bar> {
    fn from(pattern: RhythmPattern) -> Self {
        pattern.bars
    }
}

/// Macro for writing rhythm patterns with a concise syntax
///
/// Each bracketed group is one beat. `hh` and `sd` are voice hits, `_` is a
/// rest. Expands to `Result<RhythmPattern>`, since a bar may be empty.
///
/// # Examples
///
/// ```
/// use beatsynth::rhythm;
///
/// // The classic alternating pattern
/// let backbeat = rhythm![[hh, sd], [sd, hh], [hh, sd], [sd, hh]].unwrap();
/// assert_eq!(backbeat.len(), 4);
///
/// // Rests and uneven subdivisions
/// let sparse = rhythm![[hh, _], [hh, hh, hh]].unwrap();
/// assert_eq!(sparse.bars()[1].len(), 3);
/// ```
#[macro_export]
macro_rules! rhythm {
    ($([$($slot:tt),* $(,)?]),+ $(,)?) => {
        $crate::sequencing::RhythmPattern::new(vec![
            $($crate::sequencing::Bar::new(vec![$($crate::rhythm!(@slot $slot)),*])),+
        ])
    };

    // Rest slot
    (@slot _) => {
        $crate::sequencing::Slot::Rest
    };

    (@slot hh) => {
        $crate::sequencing::Slot::Hit($crate::sequencing::Voice::HiHat)
    };

    (@slot sd) => {
        $crate::sequencing::Slot::Hit($crate::sequencing::Voice::Snare)
    };

    // Any other single token, e.g. a `Voice` constant in scope
    (@slot $voice:tt) => {
        $crate::sequencing::Slot::from($voice)
    };
}
