#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Parameter changes sent from a control thread to the audio thread
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Cutoff position in [0, 1]
    SetCutoff(f64),
    SetGain(f64),
    SetGainMultiplier(f64),
    /// Fade out over `release` seconds, then retire
    Stop { release: f64 },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}
