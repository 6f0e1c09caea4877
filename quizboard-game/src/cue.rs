//! Discrete audio cue events emitted by the session.
//!
//! Playback lives outside the engine. Sinks only observe: they cannot fail
//! or hold up a transition.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    Select,
    Reveal,
    Correct,
    Incorrect,
    DailyDouble,
    FinalIntro,
    GameEnd,
}

impl Cue {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Reveal => "reveal",
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::DailyDouble => "dailyDouble",
            Self::FinalIntro => "finalIntro",
            Self::GameEnd => "gameEnd",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Receiver of cue events at the audio boundary.
pub trait CueSink {
    fn play(&mut self, cue: Cue);
}

/// Sink that records every cue in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueLog {
    cues: Vec<Cue>,
}

impl CueLog {
    #[must_use]
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    #[must_use]
    pub fn last(&self) -> Option<Cue> {
        self.cues.last().copied()
    }

    /// Take the recorded cues, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}

impl CueSink for CueLog {
    fn play(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

/// Sink for hosts with sound switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Muted;

impl CueSink for Muted {
    fn play(&mut self, _cue: Cue) {}
}
