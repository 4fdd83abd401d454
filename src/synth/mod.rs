// Purpose: the beat synth itself. Pattern events become routed one-shot
// sources, shaped by a per-synth timbre chain.

pub mod beat;
pub mod dispatch;
pub mod kit;
pub mod message;
pub mod timbre;
pub mod voice;

pub use beat::{BeatSynth, SynthState};
pub use dispatch::{Dispatch, DispatchStats, EventDispatcher};
pub use message::{ControlMessage, MessageReceiver};
pub use timbre::{RouteTargets, TimbreChain};
pub use voice::{Route, VoiceBank, VoiceEntry, DEFAULT_ROUTES};
