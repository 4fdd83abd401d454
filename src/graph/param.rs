/*
Parameter Automation
====================

An AudioParam is a value that can change over time on a schedule, rather
than only when someone pokes it. The audio thread samples the schedule while
rendering, so changes land with sample accuracy no matter when the request
was made.

Vocabulary
----------

  intrinsic value  The value used before any scheduled event. `set_value`
                   replaces it and drops the schedule.

  event            A point on the timeline: SetValue (jump at time t) or
                   LinearRamp (arrive at the value at time t, moving in a
                   straight line from the previous event).

  cancel           Remove every event at or after a time. The value then
                   falls back to whatever the remaining events say.


The Shape
---------

    set_value_at_time(0.8, 1.0)
    linear_ramp_to_value_at_time(0.0, 1.5)

  value
    0.8 ┤━━━━━━━━━━━━━━━━━━━━━┓
        │                     ┃╲
        │                     ┃ ╲
    0.0 ┤                     ┃  ╲━━━━━━
        └─────────────────────┸───┸──────→ time
                             1.0  1.5

A ramp starts from the event before it. With no earlier event there is no
start point, so the value holds until the ramp's end time and then jumps.
Callers that want a smooth ramp from "now" first pin the current value with
`set_value_at_time(value_at(now), now)`, which is exactly what the timbre
chain does before every gain change.


Last Write Wins
---------------

    cancel_scheduled_values(now)
    set_value_at_time(value_at(now), now)
    linear_ramp_to_value_at_time(target, now + ramp)

Issued together, these three calls replace whatever was in flight with one
fresh ramp that starts where the old one was interrupted. No overlapping
ramps, no jump.
*/

/// One scheduled change on a parameter timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    /// Jump to `value` at `time`
    SetValue { time: f64, value: f32 },
    /// Arrive at `value` at `time`, moving linearly from the previous event
    LinearRamp { time: f64, value: f32 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. } | ParamEvent::LinearRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            ParamEvent::SetValue { value, .. } | ParamEvent::LinearRamp { value, .. } => value,
        }
    }
}

/// A continuously automatable parameter
#[derive(Debug, Clone, PartialEq)]
pub struct AudioParam {
    value: f32,
    events: Vec<ParamEvent>,
}

impl AudioParam {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    /// Set the value immediately, discarding any scheduled automation
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
        self.events.clear();
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent::SetValue { time, value });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, end_time: f64) {
        self.insert(ParamEvent::LinearRamp {
            time: end_time,
            value,
        });
    }

    /// Remove every event scheduled at or after `from`
    pub fn cancel_scheduled_values(&mut self, from: f64) {
        self.events.retain(|event| event.time() < from);
    }

    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    /// Sample the timeline at `time`
    pub fn value_at(&self, time: f64) -> f32 {
        let mut prev_time = f64::NEG_INFINITY;
        let mut prev_value = self.value;

        for event in &self.events {
            if event.time() <= time {
                prev_time = event.time();
                prev_value = event.value();
                continue;
            }

            // First event still in the future decides what happens between
            return match *event {
                ParamEvent::LinearRamp { time: end, value } if prev_time.is_finite() => {
                    let span = end - prev_time;
                    let progress = ((time - prev_time) / span) as f32;
                    prev_value + (value - prev_value) * progress
                }
                _ => prev_value,
            };
        }

        prev_value
    }

    /// Write one value per sample, starting at `start_time`
    pub fn fill(&self, start_time: f64, sample_rate: f32, out: &mut [f32]) {
        // Fast path: nothing moving during this block
        let end_time = start_time + out.len() as f64 / sample_rate as f64;
        if self
            .events
            .iter()
            .all(|event| event.time() <= start_time || event.time() > end_time)
            && !self.ramp_spans(start_time)
        {
            out.fill(self.value_at(start_time));
            return;
        }

        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start_time + i as f64 * dt);
        }
    }

    /// Drop events that can no longer influence values at or after `now`
    pub fn prune(&mut self, now: f64) {
        let Some(last_past) = self.events.iter().rposition(|event| event.time() <= now) else {
            return;
        };

        if last_past + 1 == self.events.len() {
            // Whole schedule is behind us: fold it into the intrinsic value
            self.value = self.events[last_past].value();
            self.events.clear();
        } else {
            // Keep the latest past event as the start point of what follows
            self.events.drain(..last_past);
        }
    }

    fn ramp_spans(&self, time: f64) -> bool {
        let has_past = self.events.iter().any(|event| event.time() <= time);
        has_past
            && self
                .events
                .iter()
                .find(|event| event.time() > time)
                .is_some_and(|event| matches!(event, ParamEvent::LinearRamp { .. }))
    }

    fn insert(&mut self, event: ParamEvent) {
        let index = self
            .events
            .partition_point(|existing| existing.time() <= event.time());
        self.events.insert(index, event);
    }
}

impl Default for AudioParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_value_without_events() {
        let param = AudioParam::new(0.5);
        assert_eq!(param.value_at(0.0), 0.5);
        assert_eq!(param.value_at(100.0), 0.5);
    }

    #[test]
    fn test_set_value_at_time_jumps() {
        let mut param = AudioParam::new(1.0);
        param.set_value_at_time(0.25, 2.0);

        assert_eq!(param.value_at(1.999), 1.0);
        assert_eq!(param.value_at(2.0), 0.25);
        assert_eq!(param.value_at(3.0), 0.25);
    }

    #[test]
    fn test_linear_ramp_interpolates_from_previous_event() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(1.0, 1.0);
        param.linear_ramp_to_value_at_time(0.0, 2.0);

        assert_eq!(param.value_at(1.0), 1.0);
        assert!((param.value_at(1.25) - 0.75).abs() < 1e-6);
        assert!((param.value_at(1.5) - 0.5).abs() < 1e-6);
        assert_eq!(param.value_at(2.0), 0.0);
        assert_eq!(param.value_at(5.0), 0.0);
    }

    #[test]
    fn test_ramp_without_start_holds_then_lands() {
        let mut param = AudioParam::new(0.4);
        param.linear_ramp_to_value_at_time(1.0, 1.0);

        assert_eq!(param.value_at(0.5), 0.4);
        assert_eq!(param.value_at(1.0), 1.0);
    }

    #[test]
    fn test_cancel_removes_events_from_time() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(1.0, 1.0);
        param.linear_ramp_to_value_at_time(0.5, 2.0);
        param.set_value_at_time(0.1, 3.0);

        param.cancel_scheduled_values(2.0);

        assert_eq!(param.events().len(), 1);
        assert_eq!(param.value_at(2.5), 1.0);
    }

    #[test]
    fn test_set_value_discards_schedule() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(1.0, 1.0);
        param.set_value(0.3);

        assert!(param.events().is_empty());
        assert_eq!(param.value_at(2.0), 0.3);
    }

    #[test]
    fn test_events_stay_sorted() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(3.0, 3.0);
        param.set_value_at_time(1.0, 1.0);
        param.set_value_at_time(2.0, 2.0);

        let times: Vec<f64> = param.events().iter().map(ParamEvent::time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_fill_matches_value_at() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(0.0, 0.0);
        param.linear_ramp_to_value_at_time(1.0, 0.001);

        let sample_rate = 48_000.0;
        let mut block = vec![0.0f32; 96];
        param.fill(0.0, sample_rate, &mut block);

        for (i, &value) in block.iter().enumerate() {
            let expected = param.value_at(i as f64 / sample_rate as f64);
            assert!((value - expected).abs() < 1e-6, "sample {i}: {value} vs {expected}");
        }
        assert!(block[24] > 0.4 && block[24] < 0.6);
        assert_eq!(block[95], 1.0);
    }

    #[test]
    fn test_prune_keeps_ramp_start() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(0.0, 0.5);
        param.set_value_at_time(1.0, 1.0);
        param.linear_ramp_to_value_at_time(0.0, 2.0);

        let before = param.value_at(1.5);
        param.prune(1.2);

        assert_eq!(param.events().len(), 2);
        assert_eq!(param.value_at(1.5), before);
    }

    #[test]
    fn test_prune_folds_finished_schedule() {
        let mut param = AudioParam::new(1.0);
        param.set_value_at_time(1.0, 0.0);
        param.linear_ramp_to_value_at_time(0.2, 0.05);

        param.prune(0.1);

        assert!(param.events().is_empty());
        assert_eq!(param.value_at(0.1), 0.2);
    }
}
