//! Team roster, scores and the active-team pointer.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::MAX_TEAMS;

/// Identifier of a team, `team-{n}` for the n-th team created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Id of the team created at 1-based `position`.
    #[must_use]
    pub fn for_position(position: usize) -> Self {
        Self(format!("team-{position}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Never negative; every delta is clamped at zero.
    pub score: i64,
}

impl Team {
    #[must_use]
    pub fn numbered(position: usize) -> Self {
        Self {
            id: TeamId::for_position(position),
            name: format!("Team {position}"),
            score: 0,
        }
    }
}

/// Either a roster position or a team id.
#[derive(Debug, Clone, Copy)]
pub enum TeamRef<'a> {
    Index(usize),
    Id(&'a TeamId),
}

impl From<usize> for TeamRef<'_> {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl<'a> From<&'a TeamId> for TeamRef<'a> {
    fn from(value: &'a TeamId) -> Self {
        Self::Id(value)
    }
}

/// One row of the ranked standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub team_id: TeamId,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBoard {
    teams: SmallVec<[Team; MAX_TEAMS]>,
    active: usize,
}

impl ScoreBoard {
    /// Roster of `count` numbered teams at zero points, team 1 active.
    #[must_use]
    pub fn with_team_count(count: usize) -> Self {
        Self {
            teams: (1..=count).map(Team::numbered).collect(),
            active: 0,
        }
    }

    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active_team(&self) -> Option<&Team> {
        self.teams.get(self.active)
    }

    #[must_use]
    pub fn position(&self, id: &TeamId) -> Option<usize> {
        self.teams.iter().position(|team| &team.id == id)
    }

    #[must_use]
    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|team| &team.id == id)
    }

    fn resolve(&self, team: TeamRef<'_>) -> Option<usize> {
        match team {
            TeamRef::Index(index) => (index < self.teams.len()).then_some(index),
            TeamRef::Id(id) => self.position(id),
        }
    }

    /// Add `amount` to a team's score, flooring the result at zero.
    ///
    /// Returns the new score, or `None` when the team does not exist.
    pub fn apply_delta<'a>(&mut self, team: impl Into<TeamRef<'a>>, amount: i64) -> Option<i64> {
        let index = self.resolve(team.into())?;
        let entry = &mut self.teams[index];
        entry.score = entry.score.saturating_add(amount).max(0);
        Some(entry.score)
    }

    /// Pass the turn to the next team in roster order.
    pub fn advance_turn(&mut self) {
        if self.teams.is_empty() {
            return;
        }
        self.active = (self.active + 1) % self.teams.len();
    }

    /// Teams by score descending; ties keep creation order.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        let mut ordered: Vec<&Team> = self.teams.iter().collect();
        ordered.sort_by(|a, b| b.score.cmp(&a.score));
        ordered
            .into_iter()
            .enumerate()
            .map(|(index, team)| Standing {
                rank: index + 1,
                team_id: team.id.clone(),
                name: team.name.clone(),
                score: team.score,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.teams.clear();
        self.active = 0;
    }
}
