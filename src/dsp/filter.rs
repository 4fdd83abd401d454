use std::f32::consts::TAU;

/*
Resonant Low-Pass (State-Variable Filter)
=========================================

The low-pass passes frequencies BELOW the cutoff and attenuates those above
at 12 dB/octave. Sweeping the cutoff darkens or brightens a sound; on noise
it turns a hiss into a rumble.

Parameters:
-----------

Cutoff (Hz): where the roll-off starts.
  - 1500 Hz:   dull, "closed" hat
  - 24000 Hz:  fully open at 48 kHz (Nyquist)

Q: emphasis at the cutoff.
  - 0.707: flat (Butterworth) response
  - 16:    sharp resonant peak, the hat "whistles" at the cutoff

The TPT ("topology-preserving transform") SVF keeps the response stable
under fast cutoff changes and at high Q. Damping is k = 1/Q.

The prewarped gain g = tan(pi * fc / fs) blows up at Nyquist, so the cutoff
is held just below it.
*/

/// Highest cutoff as a fraction of the sample rate
const MAX_CUTOFF_RATIO: f32 = 0.49;
const MIN_CUTOFF_HZ: f32 = 10.0;
const MIN_Q: f32 = 0.01;

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q,
        }
    }

    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        let cutoff = self
            .cutoff_hz
            .clamp(MIN_CUTOFF_HZ, sample_rate * MAX_CUTOFF_RATIO);
        let wd = TAU * cutoff;
        let wa = (2.0 * sample_rate) * (wd / (2.0 * sample_rate)).tan();
        wa / (2.0 * sample_rate)
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    /// Filter a block in place. Cutoff and Q are read once per block.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = self.compute_g(sample_rate);
        let k = 1.0 / self.q.max(MIN_Q);

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}
