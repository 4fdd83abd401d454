//! Default drum kit buffers.
//!
//! Pre-rendered one-shot samples built from [`NoiseSource`] output, so a
//! synth has something to play without loading audio files.
//!
//! # How It Works
//!
//! - Hi-hat: white noise, brightened by a first-order high-pass, with a very
//!   short exponential decay for the tight "tss".
//! - Snare: noise rattle over a triangle body around 180 Hz, each with its own
//!   decay. More rattle than body.
//!
//! Both are normalised to a peak of 0.8 so the resonant filter has headroom.

use rand::Rng;

use super::voice::VoiceBank;
use crate::dsp::NoiseSource;
use crate::graph::AudioBuffer;
use crate::sequencing::Voice;

const PEAK: f32 = 0.8;

/// Closed hi-hat: bright noise burst
pub fn hihat<R: Rng + ?Sized>(sample_rate: f32, rng: &mut R) -> AudioBuffer {
    let len = (0.12 * sample_rate) as usize;
    let noise = NoiseSource::new(len).render_bipolar(rng);

    let mut prev = 0.0;
    let samples = noise
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            // y[n] = x[n] - x[n-1] tilts the spectrum up
            let bright = x - prev;
            prev = x;
            bright * decay(i, sample_rate, 0.02)
        })
        .collect();

    AudioBuffer::new(normalize(samples), sample_rate)
}

/// Snare: noise rattle plus a tonal body
pub fn snare<R: Rng + ?Sized>(sample_rate: f32, rng: &mut R) -> AudioBuffer {
    let len = (0.3 * sample_rate) as usize;
    let noise = NoiseSource::new(len).render_bipolar(rng);
    let body_hz = 180.0;

    let samples = noise
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let phase = (i as f32 * body_hz / sample_rate).fract();
            let triangle = 4.0 * (phase - 0.5).abs() - 1.0;
            let rattle = x * decay(i, sample_rate, 0.06);
            let body = triangle * decay(i, sample_rate, 0.04);
            0.7 * rattle + 0.3 * body
        })
        .collect();

    AudioBuffer::new(normalize(samples), sample_rate)
}

/// A voice bank with the default kit and default routes
pub fn default_bank<R: Rng + ?Sized>(sample_rate: f32, rng: &mut R) -> VoiceBank {
    VoiceBank::new()
        .with(Voice::HiHat, hihat(sample_rate, rng))
        .with(Voice::Snare, snare(sample_rate, rng))
}

fn decay(index: usize, sample_rate: f32, time_constant: f32) -> f32 {
    (-(index as f32) / (time_constant * sample_rate)).exp()
}

fn normalize(mut samples: Vec<f32>) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    if peak > 0.0 {
        let scale = PEAK / peak;
        samples.iter_mut().for_each(|s| *s *= scale);
    }
    samples
}
