/*
Pull-Based Scheduling
=====================

A time engine never runs its own timer. The scheduler asks it "advance to
`now`" and the engine answers with the next time it wants to be asked again.
Between those two moments the engine is idle and costs nothing.

    driver ──run_until(horizon)──→ Scheduler
                                     │  earliest engine whose wake time <= horizon
                                     ↓
                               engine.advance_time(wake)
                                     │
                          Some(next) │ None
                       reschedule ←──┴──→ retire

Engines are always called with their own requested wake time, in time order
across engines, so an engine may treat `now` as a clean grid position. A late
driver simply catches up on the next `run_until`; there is no backlog to
replay beyond what each engine asks for.

An engine that answers with a time that does not move forward would be called
forever. That is treated as a bug in the engine: it is logged and retired.

Time base:
----------

Wake times and horizons are in whatever time base the engines speak. For a
`BeatSynth` that is logical (sync) time, so a driver holding a device clock
converts it with `SyncProvider::sync_time` before asking the scheduler.

A block driver renders [block_start, block_end) and uses `run_before`: a wake
that falls exactly on the block end belongs to the next block.
*/

/// Something that is driven by a pull-based scheduler
pub trait TimeEngine {
    /// Do the work due at `now`. Returns the next time to be called, or
    /// `None` once the engine has nothing more to do.
    ///
    /// `now` and the returned time share the engine's own time base (logical
    /// sync time for a `BeatSynth`), not necessarily the device clock.
    fn advance_time(&mut self, now: f64) -> Option<f64>;
}

impl<T: TimeEngine + ?Sized> TimeEngine for Box<T> {
    fn advance_time(&mut self, now: f64) -> Option<f64> {
        (**self).advance_time(now)
    }
}

impl<T: TimeEngine + ?Sized> TimeEngine for &mut T {
    fn advance_time(&mut self, now: f64) -> Option<f64> {
        (**self).advance_time(now)
    }
}

/// Handle to an engine added to a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

struct Entry<E> {
    id: EngineId,
    engine: E,
    next: f64,
}

/// Drives any number of time engines in wake-time order
pub struct Scheduler<E = Box<dyn TimeEngine + Send>> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E: TimeEngine> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an engine; its first call happens at `start`
    pub fn add(&mut self, engine: E, start: f64) -> EngineId {
        let id = EngineId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            engine,
            next: start,
        });
        tracing::debug!(engine = id.0, start, "engine added");
        id
    }

    /// Remove an engine before it retires on its own
    pub fn remove(&mut self, id: EngineId) -> Option<E> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).engine)
    }

    pub fn get(&self, id: EngineId) -> Option<&E> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.engine)
    }

    pub fn get_mut(&mut self, id: EngineId) -> Option<&mut E> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.engine)
    }

    pub fn contains(&self, id: EngineId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Engines still wanting calls
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending wake time
    pub fn next_time(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|entry| entry.next)
            .min_by(f64::total_cmp)
    }

    /// Wake time of one engine
    pub fn next_time_of(&self, id: EngineId) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.next)
    }

    /// Call every engine whose wake time is at or before `horizon`, in time
    /// order, until none is due. Returns the number of calls made.
    ///
    /// `horizon` is in the engines' time base; see [`TimeEngine::advance_time`].
    pub fn run_until(&mut self, horizon: f64) -> usize {
        self.run(|next| next <= horizon)
    }

    /// Like [`Scheduler::run_until`], but a wake exactly at `horizon` is left
    /// for the next call. Meant for drivers rendering `[start, horizon)`.
    pub fn run_before(&mut self, horizon: f64) -> usize {
        self.run(|next| next < horizon)
    }

    fn run(&mut self, due: impl Fn(f64) -> bool) -> usize {
        let mut calls = 0;

        while let Some(index) = self.earliest_due(&due) {
            let entry = &mut self.entries[index];
            let now = entry.next;
            calls += 1;

            match entry.engine.advance_time(now) {
                Some(next) if next > now => entry.next = next,
                Some(next) => {
                    tracing::warn!(engine = entry.id.0, now, next, "engine stalled, retiring");
                    self.entries.remove(index);
                }
                None => {
                    tracing::info!(engine = entry.id.0, now, "engine finished");
                    self.entries.remove(index);
                }
            }
        }

        calls
    }

    fn earliest_due(&self, due: impl Fn(f64) -> bool) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| due(entry.next))
            .min_by(|(_, a), (_, b)| a.next.total_cmp(&b.next))
            .map(|(index, _)| index)
    }
}

impl<E: TimeEngine> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
