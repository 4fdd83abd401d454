// Purpose: drive time engines from a single pull-based clock

pub mod scheduler;

pub use scheduler::{EngineId, Scheduler, TimeEngine};
