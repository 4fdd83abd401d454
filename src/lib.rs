pub mod config;
pub mod dsp;
pub mod engine; // Pull-based scheduling of time engines
pub mod error;
pub mod graph; // Audio environment: nodes, automation, rendering
pub mod io;
pub mod sequencing; // Tempo, rhythm patterns and beat quantization
pub mod synth; // Dispatch, routing and timbre of pattern events

pub use config::BeatSynthConfig;
pub use error::{BeatError, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
