//! White noise buffers for percussive synthesis.

use rand::Rng;

/// Produces fixed-length buffers of independent uniform random samples.
///
/// Samples are drawn uniformly from `[0, 1)`. Use [`NoiseSource::render_bipolar`]
/// for a zero-mean signal in `[-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSource {
    len: usize,
}

impl NoiseSource {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    /// One second of noise at `sample_rate`
    pub fn one_second(sample_rate: f32) -> Self {
        Self::new(sample_rate.max(0.0) as usize)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        (0..self.len).map(|_| rng.gen::<f32>()).collect()
    }

    pub fn render_bipolar<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        (0..self.len).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }
}
