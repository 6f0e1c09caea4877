use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cue::{Cue, CueSink};
use crate::error::Rejection;
use crate::scoreboard::TeamId;
use crate::session::{GameSession, Phase};
use crate::wager::FinalOutcome;

/// Host verdict on a regular clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeOutcome {
    Correct,
    Incorrect,
    NoResponse,
}

/// Every input the session accepts, as data.
///
/// Feeding the same actions to sessions built from the same board and
/// config reproduces the same state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    StartGame { teams: usize },
    SelectClue { category: usize, clue: usize },
    ConfirmDailyDouble,
    DismissDailyDouble,
    RevealAnswer,
    RecordWager { team: TeamId, amount: i64 },
    Judge { outcome: JudgeOutcome },
    JudgeFinal { team: TeamId, outcome: FinalOutcome },
    OpenFinal,
    FinishFinal,
    CloseClue,
    DebugFastForward,
    ToggleDailyDoubleMarkers,
    AdvanceClock { millis: u64 },
    Reset,
}

/// Observable effect of an accepted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Phase after the operation.
    pub phase: Phase,
    pub cue: Option<Cue>,
}

impl Step {
    /// Hand the cue, if any, to an audio sink.
    pub fn forward_to(&self, sink: &mut impl CueSink) {
        if let Some(cue) = self.cue {
            sink.play(cue);
        }
    }
}

impl GameSession {
    /// Apply one action in place.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] of the underlying operation; the session is
    /// left untouched in that case.
    pub fn apply(&mut self, action: &Action) -> Result<Step, Rejection> {
        match action {
            Action::StartGame { teams } => self.start_game(*teams),
            Action::SelectClue { category, clue } => self.select_clue(*category, *clue),
            Action::ConfirmDailyDouble => self.confirm_daily_double(),
            Action::DismissDailyDouble => self.dismiss_daily_double(),
            Action::RevealAnswer => self.reveal_answer(),
            Action::RecordWager { team, amount } => self.record_wager(team, *amount),
            Action::Judge { outcome } => self.judge(*outcome),
            Action::JudgeFinal { team, outcome } => self.judge_final(team, *outcome),
            Action::OpenFinal => self.open_final(),
            Action::FinishFinal => self.finish_final(),
            Action::CloseClue => self.close_clue(),
            Action::DebugFastForward => self.debug_fast_forward(),
            Action::ToggleDailyDoubleMarkers => self.toggle_daily_double_markers(),
            Action::AdvanceClock { millis } => Ok(self.advance_clock(Duration::from_millis(*millis))),
            Action::Reset => Ok(self.reset()),
        }
    }
}

/// Pure transition: consume a session and an action, yield the next session.
pub fn reduce(mut session: GameSession, action: &Action) -> (GameSession, Result<Step, Rejection>) {
    let result = session.apply(action);
    (session, result)
}
