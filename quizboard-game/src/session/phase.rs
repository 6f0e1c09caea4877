use serde::Serialize;

use crate::board::ClueId;

/// Node of the session state machine.
///
/// `ClueOpen` is the single open-clue slot; holding the id in the phase
/// keeps "two clues open" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    TeamSetup,
    Board,
    DailyDoubleIntro { pending: ClueId },
    ClueOpen { clue: ClueId, revealed: bool },
    FinalIntro,
    FinalStandings,
}

impl Phase {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TeamSetup => "team setup",
            Self::Board => "board",
            Self::DailyDoubleIntro { .. } => "daily double intro",
            Self::ClueOpen { .. } => "clue open",
            Self::FinalIntro => "final intro",
            Self::FinalStandings => "final standings",
        }
    }

    /// Clue currently shown to the players.
    #[must_use]
    pub const fn open_clue(self) -> Option<ClueId> {
        match self {
            Self::ClueOpen { clue, .. } => Some(clue),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::ClueOpen { revealed: true, .. })
    }
}
