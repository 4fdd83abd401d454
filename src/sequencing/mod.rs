pub mod clock;
pub mod pattern;
pub mod tempo;
pub mod voice;

pub use clock::{DueEvent, DueEvents, PatternClock};
pub use pattern::{Bar, RhythmPattern, Slot};
pub use tempo::Tempo;
pub use voice::Voice;
