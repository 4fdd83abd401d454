//! Real-world scenario benchmarks.
//!
//! Clock evaluation as the scheduler drives it, and full offline renders of
//! a playing pattern through the audio graph.

mod clock;
mod render;

pub use clock::bench_clock;
pub use render::bench_render;
