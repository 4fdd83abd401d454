/*
Pattern Clock
=============

The clock answers one question: given an absolute time, which beat comes
next, and which slots fire inside it?

It keeps NO playback cursor. Every call recomputes the beat grid from the
time it is handed:

    phase        = now mod beat_period        (Euclidean, so >= 0)
    beat_start   = now - phase                (start of the beat holding now)
    next_start   = beat_start + beat_period   (the boundary we schedule for)
    beat         = round(beat_start / beat_period)
    bar          = pattern[beat mod len]

    slot i of an S-slot bar fires at  next_start + i * (beat_period / S)

Then it hands back `next_start` as the time it wants to be asked again.

      beat k            beat k+1           beat k+2
    |-----------------|-----------------|-----------------|
          ^ now        ^ next_start
                       [ bar(k) slots  ]
                       ^ next wake

Because nothing accumulates, a driver that wakes late (or skips a wake, or
restarts from an arbitrary time) gets exactly the answer it would have got
on time: the result is a pure function of `now`, the tempo and the pattern.

Calling exactly on a boundary (phase = 0) schedules the FOLLOWING beat, so the
returned wake time is always strictly in the future and never more than one
beat away.

Valid range:
------------

The grid is only exact while a beat is much wider than the float spacing at
`now`. Past `max_time()` (2^40 beats, far beyond any session) `next_start` could round back onto `now`, so callers check
`in_range` first and stop instead of stalling.

Indexing uses an integer beat number, never raw seconds, so a pattern of any
length cycles through every bar regardless of tempo. A session that starts
anywhere in [0, beat_period) plays bar 0 first.
*/

use std::sync::Arc;

use super::{pattern::RhythmPattern, tempo::Tempo, voice::Voice};

/// Beats either side of zero the grid stays exact for
const MAX_BEATS: f64 = (1u64 << 40) as f64;

/// A slot trigger due in the upcoming beat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueEvent {
    /// Logical (sync) time the slot fires at
    pub time: f64,
    pub voice: Voice,
    /// Slot position within its bar
    pub slot: usize,
}

/// Everything scheduled by one clock evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct DueEvents {
    /// Integer number of the beat containing `now`
    pub beat: i64,
    /// Bar of the pattern being emitted
    pub bar: usize,
    /// Start of the beat window the events fall into
    pub beat_start: f64,
    /// Hits in slot order (rests are skipped)
    pub events: Vec<DueEvent>,
    /// When the clock wants to be evaluated again
    pub next_wake: f64,
}

/// Quantizes absolute time onto a tempo grid and reads a cyclic pattern off it
#[derive(Debug, Clone)]
pub struct PatternClock {
    pattern: Arc<RhythmPattern>,
    tempo: Tempo,
}

impl PatternClock {
    pub fn new(pattern: Arc<RhythmPattern>, tempo: Tempo) -> Self {
        Self { pattern, tempo }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn pattern(&self) -> &RhythmPattern {
        &self.pattern
    }

    /// Largest `|now|` the clock answers exactly for
    pub fn max_time(&self) -> f64 {
        self.tempo.beat_period() * MAX_BEATS
    }

    /// Whether `now` is finite and inside [`PatternClock::max_time`]
    pub fn in_range(&self, now: f64) -> bool {
        now.is_finite() && now.abs() <= self.max_time()
    }

    /// Beat number and start time of the beat containing `now`
    pub fn beat_at(&self, now: f64) -> (i64, f64) {
        let period = self.tempo.beat_period();
        let phase = now.rem_euclid(period);
        let mut beat_start = now - phase;

        // rem_euclid can round to `period` for values just below a boundary
        if beat_start + period <= now {
            beat_start += period;
        }
        if beat_start > now {
            beat_start -= period;
        }

        let beat = (beat_start / period).round() as i64;
        (beat, beat_start)
    }

    /// Integer number of the beat containing `now`
    pub fn beat_number(&self, now: f64) -> i64 {
        self.beat_at(now).0
    }

    /// Enumerate the slot triggers of the next beat and the next wake time
    pub fn compute_due_events(&self, now: f64) -> DueEvents {
        let period = self.tempo.beat_period();
        let (beat, current_start) = self.beat_at(now);
        let next_start = current_start + period;

        let bar_index = self.pattern.bar_index(beat);
        let bar = &self.pattern.bars()[bar_index];
        let unit = period / bar.len() as f64;

        let events: Vec<DueEvent> = bar
            .hits()
            .map(|(slot, voice)| DueEvent {
                time: next_start + slot as f64 * unit,
                voice,
                slot,
            })
            .collect();

        tracing::trace!(
            now,
            beat,
            bar = bar_index,
            events = events.len(),
            next_wake = next_start,
            "computed due events"
        );

        DueEvents {
            beat,
            bar: bar_index,
            beat_start: next_start,
            events,
            next_wake: next_start,
        }
    }
}
