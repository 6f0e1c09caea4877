//! Quizboard Session Engine
//!
//! Platform-agnostic controller for a host-run, turn-based quiz board game.
//! This crate owns the rules and state; rendering, audio playback and board
//! catalogs live with the host.

pub mod board;
pub mod constants;
pub mod cue;
pub mod daily_double;
pub mod error;
pub mod schedule;
pub mod scoreboard;
pub mod session;
pub mod wager;

// Re-export commonly used types
pub use board::{Board, Category, Clue, ClueId, FinalClue, ParseClueIdError};
pub use cue::{Cue, CueLog, CueSink, Muted};
pub use daily_double::{DailyDoubleAssigner, DailyDoubleMap};
pub use error::{InvalidBoardError, LoadError, Rejection};
pub use schedule::TimerSlot;
pub use scoreboard::{ScoreBoard, Standing, Team, TeamId, TeamRef};
pub use session::{
    Action, CellView, GameSession, JudgeOutcome, LoadCompletion, LoadTicket, Phase,
    SessionConfig, Step, reduce,
};
pub use wager::{FinalOutcome, FinalResults, WagerLedger};

/// Trait for abstracting board retrieval
/// Platform-specific implementations should provide this
pub trait BoardLoader {
    /// Fetch and parse the board document
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreachable or the document does not
    /// describe a valid board.
    fn load_board(&self) -> Result<Board, LoadError>;
}

/// Board held in memory as a JSON document.
#[derive(Debug, Clone, Copy)]
pub struct JsonBoard<'a>(pub &'a str);

impl BoardLoader for JsonBoard<'_> {
    fn load_board(&self) -> Result<Board, LoadError> {
        Board::from_json(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"{
        "title": "Pub Night",
        "categories": [
            { "name": "Rivers", "questions": [ { "value": 100, "clue": "Longest", "answer": "Nile" } ] },
            { "name": "Peaks", "questions": [ { "value": 100, "clue": "Tallest", "answer": "Everest" } ] }
        ],
        "finalJeopardy": { "category": "Seas", "clue": "Saltiest", "answer": "Dead Sea" }
    }"#;

    struct Offline;

    impl BoardLoader for Offline {
        fn load_board(&self) -> Result<Board, LoadError> {
            Err(LoadError::Unavailable("catalog offline".to_string()))
        }
    }

    #[test]
    fn session_loads_through_loader() {
        let mut session = GameSession::default();
        session.load_from(&JsonBoard(BOARD)).unwrap();
        let board = session.board().unwrap();
        assert_eq!(board.title, "Pub Night");
        assert!(board.has_final());
        assert_eq!(session.phase(), Phase::TeamSetup);
        assert!(!session.is_loading());
    }

    #[test]
    fn loader_errors_surface_and_clear_board() {
        let mut session = GameSession::default();
        session.load_from(&JsonBoard(BOARD)).unwrap();
        let err = session.load_from(&Offline).unwrap_err();
        assert!(matches!(err, LoadError::Unavailable(_)));
        assert!(session.board().is_none());

        let err = session.load_from(&JsonBoard(r#"{ "title": "x", "categories": [] }"#)).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(InvalidBoardError::NoCategories)));
    }
}
