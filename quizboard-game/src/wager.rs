//! Wager capture for bonus clues and final-round resolution.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::ClueId;
use crate::error::Rejection;
use crate::scoreboard::TeamId;

/// Verdict for one team on the final clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalOutcome {
    Correct,
    Incorrect,
}

impl FinalOutcome {
    /// Signed score change for a team that wagered `wager`.
    #[must_use]
    pub const fn delta(self, wager: i64) -> i64 {
        match self {
            Self::Correct => wager,
            Self::Incorrect => -wager,
        }
    }
}

/// Per-clue, per-team wagers. Amounts are stored clamped at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WagerLedger {
    entries: BTreeMap<ClueId, BTreeMap<TeamId, i64>>,
}

impl WagerLedger {
    /// Record a wager, replacing any earlier one for the same pair.
    ///
    /// Returns the amount actually stored.
    pub fn record(&mut self, clue: ClueId, team: TeamId, amount: i64) -> i64 {
        let stored = amount.max(0);
        self.entries.entry(clue).or_default().insert(team, stored);
        stored
    }

    /// Wager for the pair, 0 when none was entered.
    #[must_use]
    pub fn wager(&self, clue: ClueId, team: &TeamId) -> i64 {
        self.entries
            .get(&clue)
            .and_then(|by_team| by_team.get(team))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn wagers_for(&self, clue: ClueId) -> Option<&BTreeMap<TeamId, i64>> {
        self.entries.get(&clue)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Final-round verdicts collected while the final clue is being judged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalResults {
    results: BTreeMap<TeamId, FinalOutcome>,
}

impl FinalResults {
    /// Record a verdict; each team can be judged once.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::AlreadyJudged`] if the team already has a verdict.
    pub fn record(&mut self, team: TeamId, outcome: FinalOutcome) -> Result<(), Rejection> {
        if self.results.contains_key(&team) {
            return Err(Rejection::AlreadyJudged(team));
        }
        self.results.insert(team, outcome);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, team: &TeamId) -> Option<FinalOutcome> {
        self.results.get(team).copied()
    }

    #[must_use]
    pub fn contains(&self, team: &TeamId) -> bool {
        self.results.contains_key(team)
    }

    /// True once every listed team has a verdict.
    pub fn covers<'a>(&self, mut teams: impl Iterator<Item = &'a TeamId>) -> bool {
        teams.all(|team| self.results.contains_key(team))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
