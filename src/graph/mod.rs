//! The audio output graph the scheduler talks to.
//!
//! This is the collaborator side of the crate: node creation, connection,
//! parameter automation and a sample-accurate clock. The synth only depends
//! on the [`AudioEnv`] trait; [`AudioContext`] is the in-process
//! implementation used by the player binary, the tests and the benches.

/// Shared immutable sample data.
pub mod buffer;
/// Environment trait and the in-process graph renderer.
pub mod context;
/// Node handles and parameter addressing.
pub mod node;
/// Automation timelines (set, ramp, cancel).
pub mod param;

pub use buffer::AudioBuffer;
pub use context::{AudioContext, AudioEnv};
pub use node::{NodeId, ParamKind, ParamRef};
pub use param::{AudioParam, ParamEvent};
