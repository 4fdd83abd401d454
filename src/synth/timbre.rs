/*
Timbre Chain
============

The signal path shared by every source one synth fires:

    filtered voices ──→ [Lowpass (cutoff, Q)] ──→ [Gain] ──→ destination
    direct voices   ─────────────────────────────→ [Gain]

Two controls shape it from outside:

Cutoff position (0..1)
----------------------
Mapped exponentially so equal steps sound like equal steps:

    frequency = min_cutoff * exp(ln(max_cutoff / min_cutoff) * position)

0 gives exactly min_cutoff, 1 gives exactly max_cutoff. The new frequency
applies from the next rendered block, with no smoothing.

Gain
----
`value * gain_multiplier`, reached through a short linear ramp starting from
wherever the gain currently is. A new request cancels whatever ramp is in
flight, so the last request always wins and there are never two competing
ramps. Stopping is the same ramp with a target of zero and a caller-chosen
duration.
*/

use super::voice::Route;
use crate::config::ResolvedConfig;
use crate::error::{BeatError, Result};
use crate::graph::{AudioEnv, NodeId, ParamKind, ParamRef};

/// Node inputs a dispatched source can be connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTargets {
    pub filtered: NodeId,
    pub direct: NodeId,
}

impl RouteTargets {
    pub fn input(&self, route: Route) -> NodeId {
        match route {
            Route::Filtered => self.filtered,
            Route::Direct => self.direct,
        }
    }
}

/// Gain stage plus resonant low-pass, owned by one synth
pub struct TimbreChain<E: AudioEnv> {
    env: E,
    lowpass: NodeId,
    output: NodeId,
    min_cutoff: f64,
    max_cutoff: f64,
    log_cutoff_ratio: f64,
    cutoff: f64,
    gain_multiplier: f64,
    gain_ramp: f64,
}

impl<E: AudioEnv> TimbreChain<E> {
    /// Build the nodes and connect the output to the environment's destination
    pub fn new(env: E, config: &ResolvedConfig) -> Self {
        let output = env.create_gain();
        env.connect(output, env.destination());

        let lowpass = env.create_lowpass();
        env.connect(lowpass, output);
        env.set_value(lowpass.param(ParamKind::Frequency), config.max_cutoff as f32);
        env.set_value(lowpass.param(ParamKind::Q), config.filter_q as f32);
        env.set_value(output.param(ParamKind::Gain), 1.0);

        tracing::debug!(
            %lowpass,
            %output,
            min_cutoff = config.min_cutoff,
            max_cutoff = config.max_cutoff,
            q = config.filter_q,
            "timbre chain connected"
        );

        Self {
            env,
            lowpass,
            output,
            min_cutoff: config.min_cutoff,
            max_cutoff: config.max_cutoff,
            log_cutoff_ratio: (config.max_cutoff / config.min_cutoff).ln(),
            cutoff: 1.0,
            gain_multiplier: config.gain_multiplier,
            gain_ramp: config.gain_ramp,
        }
    }

    pub fn targets(&self) -> RouteTargets {
        RouteTargets {
            filtered: self.lowpass,
            direct: self.output,
        }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn gain_param(&self) -> ParamRef {
        self.output.param(ParamKind::Gain)
    }

    pub fn cutoff_param(&self) -> ParamRef {
        self.lowpass.param(ParamKind::Frequency)
    }

    /// Current cutoff position in [0, 1]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Current cutoff in Hz
    pub fn cutoff_hz(&self) -> f64 {
        self.frequency_for(self.cutoff)
    }

    pub fn cutoff_bounds(&self) -> (f64, f64) {
        (self.min_cutoff, self.max_cutoff)
    }

    pub fn gain_multiplier(&self) -> f64 {
        self.gain_multiplier
    }

    /// Cutoff frequency in Hz for a position in [0, 1]
    pub fn frequency_for(&self, position: f64) -> f64 {
        // Exact at the ends; exp(ln(x)) alone can miss max by an ulp
        if position >= 1.0 {
            self.max_cutoff
        } else if position <= 0.0 {
            self.min_cutoff
        } else {
            self.min_cutoff * (self.log_cutoff_ratio * position).exp()
        }
    }

    /// Move the cutoff immediately
    pub fn set_cutoff(&mut self, position: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&position) {
            return Err(BeatError::CutoffOutOfRange(position));
        }

        self.cutoff = position;
        let frequency = self.frequency_for(position);
        self.env.set_value(self.cutoff_param(), frequency as f32);
        tracing::debug!(position, frequency, "cutoff set");
        Ok(())
    }

    /// Ramp the output gain to `value * gain_multiplier`
    pub fn set_gain(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(BeatError::InvalidGain(value));
        }

        let target = value * self.gain_multiplier;
        self.ramp_gain(target, self.gain_ramp);
        Ok(())
    }

    /// Applies to the next gain request
    pub fn set_gain_multiplier(&mut self, multiplier: f64) -> Result<()> {
        if !multiplier.is_finite() {
            return Err(BeatError::InvalidGain(multiplier));
        }
        self.gain_multiplier = multiplier;
        Ok(())
    }

    /// Fade the output to silence over `release_time` seconds.
    /// Returns the audio time the fade completes at.
    pub fn stop(&mut self, release_time: f64) -> Result<f64> {
        let release_time = BeatError::check_duration("release time", release_time)?;
        Ok(self.ramp_gain(0.0, release_time))
    }

    fn ramp_gain(&mut self, target: f64, duration: f64) -> f64 {
        let param = self.gain_param();
        let now = self.env.current_time();
        let current = self.env.value_at(param, now);
        let end = now + duration;

        self.env.cancel_scheduled_values(param, now);
        self.env.set_value_at_time(param, current, now);
        self.env.linear_ramp_to_value_at_time(param, target as f32, end);

        tracing::debug!(from = current, to = target, now, end, "gain ramp");
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeatSynthConfig;
    use crate::graph::{AudioContext, ParamEvent};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn chain() -> (AudioContext, TimbreChain<AudioContext>) {
        let ctx = AudioContext::new(SAMPLE_RATE);
        let config = BeatSynthConfig::default().validate(SAMPLE_RATE).unwrap();
        let chain = TimbreChain::new(ctx.clone(), &config);
        (ctx, chain)
    }

    fn ramps(events: &[ParamEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|event| match event {
                ParamEvent::LinearRamp { value, .. } => Some(*value),
                ParamEvent::SetValue { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_starts_fully_open() {
        let (ctx, chain) = chain();
        assert_eq!(chain.cutoff(), 1.0);
        assert_eq!(chain.cutoff_hz(), 24_000.0);
        assert_eq!(ctx.value_at(chain.cutoff_param(), 0.0), 24_000.0);
        assert_eq!(ctx.value_at(chain.gain_param(), 0.0), 1.0);
    }

    #[test]
    fn test_cutoff_endpoints_hit_bounds() {
        let (ctx, mut chain) = chain();

        chain.set_cutoff(0.0).unwrap();
        assert!((chain.cutoff_hz() - 1500.0).abs() / 1500.0 < 1e-9);
        assert!((ctx.value_at(chain.cutoff_param(), 0.0) - 1500.0).abs() < 1e-3);

        chain.set_cutoff(1.0).unwrap();
        assert!((chain.cutoff_hz() - 24_000.0).abs() / 24_000.0 < 1e-9);
        assert!((ctx.value_at(chain.cutoff_param(), 0.0) - 24_000.0).abs() < 1e-2);
    }

    #[test]
    fn test_cutoff_curve_is_exponential() {
        let (_, chain) = chain();
        let mid = chain.frequency_for(0.5);
        // Geometric mean of the bounds
        assert!((mid - (1500.0f64 * 24_000.0).sqrt()).abs() < 1e-6);
        assert!(chain.frequency_for(0.25) < chain.frequency_for(0.75));
    }

    #[test]
    fn test_cutoff_out_of_range_changes_nothing() {
        let (ctx, mut chain) = chain();
        chain.set_cutoff(0.5).unwrap();
        let before = ctx.value_at(chain.cutoff_param(), 0.0);

        assert_eq!(chain.set_cutoff(1.5), Err(BeatError::CutoffOutOfRange(1.5)));
        assert_eq!(chain.set_cutoff(-0.1), Err(BeatError::CutoffOutOfRange(-0.1)));
        assert!(chain.set_cutoff(f64::NAN).is_err());

        assert_eq!(chain.cutoff(), 0.5);
        assert_eq!(ctx.value_at(chain.cutoff_param(), 0.0), before);
    }

    #[test]
    fn test_cutoff_is_not_smoothed() {
        let (ctx, mut chain) = chain();
        chain.set_cutoff(0.0).unwrap();
        assert!(ctx.scheduled_events(chain.cutoff_param()).is_empty());
    }

    #[test]
    fn test_last_gain_request_wins() {
        let (ctx, mut chain) = chain();
        chain.set_gain(0.2).unwrap();
        chain.set_gain(0.8).unwrap();

        let events = ctx.scheduled_events(chain.gain_param());
        assert_eq!(ramps(&events), vec![0.8]);
        assert!((ctx.value_at(chain.gain_param(), 0.05) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_gain_ramp_starts_from_current_value() {
        let (ctx, mut chain) = chain();
        chain.set_gain(0.0).unwrap();
        ctx.render(&mut vec![0.0; 1200]);

        // 25 ms into a 50 ms ramp from 1.0 to 0.0
        let now = ctx.current_time();
        let current = ctx.value_at(chain.gain_param(), now);
        assert!((current - 0.5).abs() < 1e-3);

        chain.set_gain(1.0).unwrap();
        assert!((ctx.value_at(chain.gain_param(), now) - current).abs() < 1e-6);
        assert!((ctx.value_at(chain.gain_param(), now + 0.05) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_gain_multiplier_scales_target() {
        let (ctx, mut chain) = chain();
        chain.set_gain_multiplier(0.5).unwrap();
        chain.set_gain(0.8).unwrap();

        assert_eq!(ramps(&ctx.scheduled_events(chain.gain_param())), vec![0.4]);
        assert!(chain.set_gain_multiplier(f64::INFINITY).is_err());
        assert_eq!(chain.gain_multiplier(), 0.5);
    }

    #[test]
    fn test_stop_fades_from_current_gain() {
        let (ctx, mut chain) = chain();
        chain.set_gain(0.6).unwrap();
        ctx.render(&mut vec![0.0; 4800]);

        let now = ctx.current_time();
        let before = ctx.value_at(chain.gain_param(), now);
        let end = chain.stop(0.5).unwrap();

        assert!((end - (now + 0.5)).abs() < 1e-12);
        assert_eq!(ctx.value_at(chain.gain_param(), now), before);
        assert_eq!(ctx.value_at(chain.gain_param(), now + 0.5), 0.0);
        assert!(chain.stop(-1.0).is_err());
    }
}
