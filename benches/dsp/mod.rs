//! Benchmarks for low-level DSP primitives.

mod filter;
mod noise;
mod param;

pub use filter::bench_filter;
pub use noise::bench_noise;
pub use param::bench_param;
