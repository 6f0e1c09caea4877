//! Error taxonomy for board loading and session operations.
use thiserror::Error;

use crate::board::ClueId;
use crate::constants::{MAX_TEAMS, MIN_TEAMS};
use crate::scoreboard::TeamId;

/// Structural problems that make a board unplayable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBoardError {
    #[error("board has no categories")]
    NoCategories,
    #[error("category {index} ({name:?}) has no clues")]
    EmptyCategory { index: usize, name: String },
    #[error("category name {name:?} appears more than once")]
    DuplicateCategory { name: String },
}

/// Failure to obtain a board from a catalog source.
///
/// Load failures are terminal for the attempt; nothing retries.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("board source unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read board: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse board: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] InvalidBoardError),
}

/// Why a session operation was ignored.
///
/// A rejected operation never changes session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{operation} is not valid during {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: &'static str,
    },
    #[error("no board is loaded")]
    NoBoard,
    #[error("clue {0} does not exist on this board")]
    UnknownClue(ClueId),
    #[error("clue {0} was already answered")]
    AlreadyAnswered(ClueId),
    #[error("clue {0} is already open")]
    ClueAlreadyOpen(ClueId),
    #[error("no clue is open")]
    NoClueOpen,
    #[error("the answer is already revealed")]
    AlreadyRevealed,
    #[error("the answer has not been revealed")]
    NotRevealed,
    #[error("clue {0} carries no point value")]
    Unscored(ClueId),
    #[error("the final clue is judged per team")]
    FinalClueOpen,
    #[error("the open clue is not the final clue")]
    NotFinalClue,
    #[error("clue {0} does not take wagers")]
    NotWagerEligible(ClueId),
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
    #[error("team {0} was already judged")]
    AlreadyJudged(TeamId),
    #[error("the board has no final clue")]
    NoFinalClue,
    #[error("team count {0} is outside {min}..={max}", min = MIN_TEAMS, max = MAX_TEAMS)]
    TeamCountOutOfRange(usize),
    #[error("board load ticket {0} is stale")]
    StaleLoad(u64),
}
