//! Low-level DSP primitives used by the audio graph and the drum kit.
//!
//! These stay focused on the signal-processing math; scheduling and routing
//! live in the graph and synth layers.

/// Uniform white noise buffers.
pub mod noise;
/// Resonant state-variable low-pass.
pub mod filter;

pub use filter::SVFilter;
pub use noise::NoiseSource;
