use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BeatError;

/// A percussive sound category that a pattern slot can trigger.
///
/// Labels follow the short drum-machine names: `hh` for the closed hi-hat,
/// `sd` for the snare. The long names are accepted when parsing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Voice {
    HiHat,
    Snare,
}

impl Voice {
    /// Every voice, in declaration order
    pub const ALL: [Voice; 2] = [Voice::HiHat, Voice::Snare];

    /// Short label used in patterns and logs
    pub const fn label(self) -> &'static str {
        match self {
            Voice::HiHat => "hh",
            Voice::Snare => "sd",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Voice {
    type Err = BeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hh" | "hihat" | "hi-hat" => Ok(Voice::HiHat),
            "sd" | "snare" => Ok(Voice::Snare),
            other => Err(BeatError::UnknownVoice(other.to_string())),
        }
    }
}

impl TryFrom<String> for Voice {
    type Error = BeatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Voice> for String {
    fn from(voice: Voice) -> Self {
        voice.label().to_string()
    }
}
