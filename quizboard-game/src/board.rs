//! Board document model and clue identity.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::FINAL_CLUE_ID;
use crate::error::{InvalidBoardError, LoadError};

/// Stable identity of a clue, derived from its position on the board.
///
/// Grid clues render as `c{category}-q{clue}` (0-based); the final clue is
/// the sentinel `final`. Ordering follows the board: category-major, then
/// clue index, with the final clue last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ClueId {
    Grid { category: usize, clue: usize },
    Final,
}

impl ClueId {
    #[must_use]
    pub const fn grid(category: usize, clue: usize) -> Self {
        Self::Grid { category, clue }
    }

    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Final)
    }

    /// Category index for grid clues.
    #[must_use]
    pub const fn category(self) -> Option<usize> {
        match self {
            Self::Grid { category, .. } => Some(category),
            Self::Final => None,
        }
    }
}

impl fmt::Display for ClueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid { category, clue } => write!(f, "c{category}-q{clue}"),
            Self::Final => f.write_str(FINAL_CLUE_ID),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid clue id {0:?}")]
pub struct ParseClueIdError(pub String);

impl FromStr for ClueId {
    type Err = ParseClueIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == FINAL_CLUE_ID {
            return Ok(Self::Final);
        }
        let parsed = trimmed
            .strip_prefix('c')
            .and_then(|rest| rest.split_once("-q"))
            .and_then(|(category, clue)| Some((category.parse().ok()?, clue.parse().ok()?)));
        match parsed {
            Some((category, clue)) => Ok(Self::grid(category, clue)),
            None => Err(ParseClueIdError(s.to_string())),
        }
    }
}

impl From<ClueId> for String {
    fn from(value: ClueId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ClueId {
    type Error = ParseClueIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single question/answer unit on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// Face value; absent or zero marks an unscored clue.
    #[serde(default)]
    pub value: Option<u32>,
    #[serde(rename = "clue")]
    pub text: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Clue {
    #[must_use]
    pub fn points(&self) -> u32 {
        self.value.unwrap_or(0)
    }

    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.points() > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "questions", default)]
    pub clues: Vec<Clue>,
}

/// End-of-game clue answered by every team against a private wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalClue {
    pub category: String,
    #[serde(rename = "clue")]
    pub text: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(rename = "finalJeopardy", default, skip_serializing_if = "Option::is_none")]
    pub final_clue: Option<FinalClue>,
}

impl Board {
    /// Parse and validate a board document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] when the JSON does not match the board
    /// shape and [`LoadError::Invalid`] when it fails validation.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let board: Self = serde_json::from_str(json)?;
        board.validate()?;
        Ok(board)
    }

    /// Check the structural invariants a playable board must hold.
    ///
    /// # Errors
    ///
    /// Returns an error when the board has no categories, a category has no
    /// clues, or two categories share a name.
    pub fn validate(&self) -> Result<(), InvalidBoardError> {
        if self.categories.is_empty() {
            return Err(InvalidBoardError::NoCategories);
        }
        let mut seen = HashSet::with_capacity(self.categories.len());
        for (index, category) in self.categories.iter().enumerate() {
            if category.clues.is_empty() {
                return Err(InvalidBoardError::EmptyCategory {
                    index,
                    name: category.name.clone(),
                });
            }
            if !seen.insert(category.name.as_str()) {
                return Err(InvalidBoardError::DuplicateCategory {
                    name: category.name.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    #[must_use]
    pub fn clue_at(&self, category: usize, clue: usize) -> Option<&Clue> {
        self.categories.get(category)?.clues.get(clue)
    }

    /// Look up a grid clue; the final clue has its own accessor.
    #[must_use]
    pub fn clue(&self, id: ClueId) -> Option<&Clue> {
        match id {
            ClueId::Grid { category, clue } => self.clue_at(category, clue),
            ClueId::Final => None,
        }
    }

    #[must_use]
    pub const fn final_clue(&self) -> Option<&FinalClue> {
        self.final_clue.as_ref()
    }

    #[must_use]
    pub const fn has_final(&self) -> bool {
        self.final_clue.is_some()
    }

    /// Whether `id` names a clue that exists on this board.
    #[must_use]
    pub fn contains(&self, id: ClueId) -> bool {
        match id {
            ClueId::Grid { .. } => self.clue(id).is_some(),
            ClueId::Final => self.has_final(),
        }
    }

    /// All grid clue ids in board order.
    pub fn clue_ids(&self) -> impl Iterator<Item = ClueId> + '_ {
        self.categories
            .iter()
            .enumerate()
            .flat_map(|(category, cat)| (0..cat.clues.len()).map(move |clue| ClueId::grid(category, clue)))
    }

    /// Number of grid clues, excluding the final clue.
    #[must_use]
    pub fn total_clues(&self) -> usize {
        self.categories.iter().map(|c| c.clues.len()).sum()
    }

    /// Longest category, i.e. the number of rows in the rendered grid.
    #[must_use]
    pub fn max_clues_per_category(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.clues.len())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Test Night",
        "subtitle": "Round one",
        "categories": [
            {
                "name": "Rivers",
                "hint": "Wet",
                "questions": [
                    { "value": 100, "clue": "Longest river", "answer": "Nile" },
                    { "value": 200, "clue": "Flows through Vienna", "answer": "Danube", "reference": "Atlas", "href": "https://example.org" }
                ]
            },
            {
                "name": "Bonus",
                "questions": [
                    { "clue": "Warm-up", "answer": "Anything" }
                ]
            }
        ],
        "finalJeopardy": { "category": "Capitals", "clue": "Capital of Peru", "answer": "Lima" }
    }"#;

    #[test]
    fn parses_board_document_shape() {
        let board = Board::from_json(SAMPLE).unwrap();
        assert_eq!(board.title, "Test Night");
        assert_eq!(board.subtitle.as_deref(), Some("Round one"));
        assert_eq!(board.categories.len(), 2);
        assert_eq!(board.categories[0].clues[1].answer, "Danube");
        assert_eq!(board.categories[0].clues[1].href.as_deref(), Some("https://example.org"));
        assert!(!board.categories[1].clues[0].is_scored());
        assert_eq!(board.final_clue().map(|f| f.answer.as_str()), Some("Lima"));
        assert_eq!(board.total_clues(), 3);
        assert_eq!(board.max_clues_per_category(), 2);
    }

    #[test]
    fn clue_ids_follow_board_order() {
        let board = Board::from_json(SAMPLE).unwrap();
        let ids: Vec<String> = board.clue_ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["c0-q0", "c0-q1", "c1-q0"]);
        assert!(board.contains(ClueId::Final));
        assert!(!board.contains(ClueId::grid(1, 1)));
    }

    #[test]
    fn clue_id_parses_and_orders_numerically() {
        assert_eq!("c3-q12".parse::<ClueId>().unwrap(), ClueId::grid(3, 12));
        assert_eq!("final".parse::<ClueId>().unwrap(), ClueId::Final);
        assert!("c3q1".parse::<ClueId>().is_err());
        assert!("cx-q1".parse::<ClueId>().is_err());
        assert!(ClueId::grid(2, 0) < ClueId::grid(10, 0));
        assert!(ClueId::grid(99, 99) < ClueId::Final);
    }

    #[test]
    fn rejects_structurally_invalid_boards() {
        let empty = r#"{ "title": "Nothing", "categories": [] }"#;
        assert!(matches!(
            Board::from_json(empty),
            Err(LoadError::Invalid(InvalidBoardError::NoCategories))
        ));

        let hollow = r#"{ "title": "Hollow", "categories": [ { "name": "A", "questions": [] } ] }"#;
        assert!(matches!(
            Board::from_json(hollow),
            Err(LoadError::Invalid(InvalidBoardError::EmptyCategory { index: 0, .. }))
        ));

        let dupes = r#"{ "title": "Twice", "categories": [
            { "name": "A", "questions": [ { "value": 1, "clue": "x", "answer": "y" } ] },
            { "name": "A", "questions": [ { "value": 1, "clue": "x", "answer": "y" } ] }
        ] }"#;
        assert!(matches!(
            Board::from_json(dupes),
            Err(LoadError::Invalid(InvalidBoardError::DuplicateCategory { .. }))
        ));

        assert!(matches!(Board::from_json("{"), Err(LoadError::Parse(_))));
    }
}
