//! The game session state machine.
//!
//! `GameSession` owns every piece of mutable game state. Each operation
//! either applies completely and returns a [`Step`], or returns a
//! [`Rejection`] and leaves the session exactly as it was.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::BoardLoader;
use crate::board::{Board, ClueId};
use crate::constants::{
    DAILY_DOUBLE_MULTIPLIER, DAILY_DOUBLE_STREAM_TAG, DEFAULT_SEED, FINAL_OFFER_DELAY_MS,
    MAX_TEAMS, MIN_TEAMS,
};
use crate::cue::Cue;
use crate::daily_double::{DailyDoubleAssigner, DailyDoubleMap, derive_stream_seed};
use crate::error::{InvalidBoardError, LoadError, Rejection};
use crate::schedule::TimerSlot;
use crate::scoreboard::{ScoreBoard, Standing, Team, TeamId};
use crate::wager::{FinalOutcome, FinalResults, WagerLedger};

pub mod action;
pub mod loading;
pub mod phase;

pub use action::{Action, JudgeOutcome, Step, reduce};
pub use loading::{LoadCompletion, LoadGuard, LoadTicket};
pub use phase::Phase;

/// Host-supplied tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// User seed for the daily-double stream.
    pub seed: u64,
    /// Delay before the final intro is offered once the grid is cleared.
    pub final_offer_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            final_offer_delay_ms: FINAL_OFFER_DELAY_MS,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn final_offer_delay(&self) -> Duration {
        Duration::from_millis(self.final_offer_delay_ms)
    }
}

/// Render-ready state of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub id: ClueId,
    pub value: u32,
    pub answered: bool,
    /// Set only while daily-double markers are toggled on.
    pub daily_double_marker: bool,
}

fn wrong_phase(operation: &'static str, phase: Phase) -> Rejection {
    Rejection::WrongPhase {
        operation,
        phase: phase.name(),
    }
}

/// Rejection for operations that need an open clue.
fn needs_open_clue(operation: &'static str, phase: Phase) -> Rejection {
    match phase {
        Phase::Board => Rejection::NoClueOpen,
        other => wrong_phase(operation, other),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    config: SessionConfig,
    board: Option<Board>,
    phase: Phase,
    scoreboard: ScoreBoard,
    answered: BTreeSet<ClueId>,
    daily_doubles: DailyDoubleMap,
    wagers: WagerLedger,
    final_results: FinalResults,
    show_daily_double_markers: bool,
    clock: Duration,
    final_offer: TimerSlot,
    #[serde(skip)]
    loads: LoadGuard,
    #[serde(skip)]
    rng: ChaCha20Rng,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl GameSession {
    /// Empty session awaiting a board.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            board: None,
            phase: Phase::TeamSetup,
            scoreboard: ScoreBoard::default(),
            answered: BTreeSet::new(),
            daily_doubles: DailyDoubleMap::default(),
            wagers: WagerLedger::default(),
            final_results: FinalResults::default(),
            show_daily_double_markers: false,
            clock: Duration::ZERO,
            final_offer: TimerSlot::default(),
            loads: LoadGuard::default(),
            rng: ChaCha20Rng::seed_from_u64(derive_stream_seed(
                config.seed,
                DAILY_DOUBLE_STREAM_TAG,
            )),
        }
    }

    /// Session with `board` installed, waiting for team setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the board fails validation.
    pub fn with_board(board: Board, config: SessionConfig) -> Result<Self, InvalidBoardError> {
        let mut session = Self::new(config);
        session.initialize(board)?;
        Ok(session)
    }

    /// Rebuild a session by replaying an action log.
    ///
    /// # Errors
    ///
    /// Returns an error if the board fails validation.
    pub fn replay<'a>(
        board: Board,
        config: SessionConfig,
        actions: impl IntoIterator<Item = &'a Action>,
    ) -> Result<(Self, Vec<Result<Step, Rejection>>), InvalidBoardError> {
        let mut session = Self::with_board(board, config)?;
        let results = actions
            .into_iter()
            .map(|action| session.apply(action))
            .collect();
        Ok((session, results))
    }

    // ----------------------------------------------------------------------
    // Board loading

    /// Install a board and return to team setup with all game state cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the board has no categories, an empty category,
    /// or duplicate category names. The session is unchanged on error.
    pub fn initialize(&mut self, board: Board) -> Result<(), InvalidBoardError> {
        board.validate()?;
        self.install(board);
        Ok(())
    }

    /// Start a board request, superseding any request still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.loads.begin();
        log::debug!("board load {} started", ticket.id());
        ticket
    }

    /// Hand a finished board request back to the session.
    ///
    /// A failed load leaves the session without a board until the next
    /// successful load.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::StaleLoad`] when `ticket` was superseded or the
    /// session was torn down; the result is discarded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Board, LoadError>,
    ) -> Result<LoadCompletion, Rejection> {
        if let Err(rejection) = self.loads.accept(ticket) {
            log::warn!("discarding board load {}: {rejection}", ticket.id());
            return Err(rejection);
        }
        let validated = result.and_then(|board| {
            board.validate()?;
            Ok(board)
        });
        match validated {
            Ok(board) => {
                self.install(board);
                Ok(LoadCompletion::Applied)
            }
            Err(err) => {
                log::warn!("board load {} failed: {err}", ticket.id());
                self.board = None;
                self.clear_game();
                Ok(LoadCompletion::Failed(err))
            }
        }
    }

    /// Load a board synchronously through `loader`.
    ///
    /// # Errors
    ///
    /// Returns the loader's error, or a validation error wrapped in
    /// [`LoadError::Invalid`].
    pub fn load_from<L: BoardLoader + ?Sized>(&mut self, loader: &L) -> Result<(), LoadError> {
        let ticket = self.begin_load();
        let result = loader.load_board();
        match self.complete_load(ticket, result) {
            Ok(LoadCompletion::Applied) => Ok(()),
            Ok(LoadCompletion::Failed(err)) => Err(err),
            Err(rejection) => Err(LoadError::Unavailable(rejection.to_string())),
        }
    }

    fn install(&mut self, board: Board) {
        log::info!(
            "board {:?} loaded: {} categories, {} clues, final: {}",
            board.title,
            board.categories.len(),
            board.total_clues(),
            board.has_final()
        );
        self.board = Some(board);
        self.clear_game();
    }

    /// Stop the session: pending timers and board loads are dropped.
    pub fn teardown(&mut self) {
        if self.final_offer.cancel() {
            log::debug!("final offer cancelled by teardown");
        }
        self.loads.invalidate();
    }

    // ----------------------------------------------------------------------
    // Game flow

    /// Create `team_count` teams, place daily doubles and open the board.
    ///
    /// # Errors
    ///
    /// Rejected without a board, outside team setup, or for a team count
    /// outside `2..=6`.
    pub fn start_game(&mut self, team_count: usize) -> Result<Step, Rejection> {
        let board = self.board.as_ref().ok_or(Rejection::NoBoard)?;
        if self.phase != Phase::TeamSetup {
            return Err(wrong_phase("start_game", self.phase));
        }
        if !(MIN_TEAMS..=MAX_TEAMS).contains(&team_count) {
            return Err(Rejection::TeamCountOutOfRange(team_count));
        }
        let daily_doubles = DailyDoubleAssigner::assign(board, &mut self.rng);
        log::info!(
            "game started with {team_count} teams, {} daily doubles",
            daily_doubles.len()
        );
        self.scoreboard = ScoreBoard::with_team_count(team_count);
        self.daily_doubles = daily_doubles;
        self.phase = Phase::Board;
        self.refresh_final_offer();
        Ok(self.step(None))
    }

    /// Pick a clue from the grid.
    ///
    /// Daily doubles stop at an intro screen first; other clues open at once.
    ///
    /// # Errors
    ///
    /// Rejected when a clue is already open, the clue is answered or missing,
    /// or the board is not showing.
    pub fn select_clue(&mut self, category: usize, clue: usize) -> Result<Step, Rejection> {
        let board = self.board.as_ref().ok_or(Rejection::NoBoard)?;
        let id = ClueId::grid(category, clue);
        match self.phase {
            Phase::Board => {}
            Phase::ClueOpen { clue: open, .. } => return Err(Rejection::ClueAlreadyOpen(open)),
            other => return Err(wrong_phase("select_clue", other)),
        }
        if !board.contains(id) {
            return Err(Rejection::UnknownClue(id));
        }
        if self.answered.contains(&id) {
            return Err(Rejection::AlreadyAnswered(id));
        }

        if self.final_offer.cancel() {
            log::debug!("final offer cancelled by selection of {id}");
        }
        if self.daily_doubles.contains(id) {
            log::debug!("daily double found at {id}");
            self.phase = Phase::DailyDoubleIntro { pending: id };
            return Ok(self.step(Some(Cue::DailyDouble)));
        }
        log::debug!("clue {id} opened");
        self.phase = Phase::ClueOpen {
            clue: id,
            revealed: false,
        };
        Ok(self.step(Some(Cue::Select)))
    }

    /// Show the daily double held by the intro screen.
    ///
    /// # Errors
    ///
    /// Rejected outside the daily double intro.
    pub fn confirm_daily_double(&mut self) -> Result<Step, Rejection> {
        let Phase::DailyDoubleIntro { pending } = self.phase else {
            return Err(wrong_phase("confirm_daily_double", self.phase));
        };
        log::debug!("daily double {pending} opened");
        self.phase = Phase::ClueOpen {
            clue: pending,
            revealed: false,
        };
        Ok(self.step(None))
    }

    /// Back out of the daily double intro; the clue stays playable.
    ///
    /// # Errors
    ///
    /// Rejected outside the daily double intro.
    pub fn dismiss_daily_double(&mut self) -> Result<Step, Rejection> {
        let Phase::DailyDoubleIntro { pending } = self.phase else {
            return Err(wrong_phase("dismiss_daily_double", self.phase));
        };
        log::debug!("daily double {pending} dismissed");
        self.phase = Phase::Board;
        self.refresh_final_offer();
        Ok(self.step(None))
    }

    /// # Errors
    ///
    /// Rejected with no open clue or when the answer is already showing.
    pub fn reveal_answer(&mut self) -> Result<Step, Rejection> {
        let Phase::ClueOpen { clue, revealed } = self.phase else {
            return Err(needs_open_clue("reveal_answer", self.phase));
        };
        if revealed {
            return Err(Rejection::AlreadyRevealed);
        }
        self.phase = Phase::ClueOpen {
            clue,
            revealed: true,
        };
        Ok(self.step(Some(Cue::Reveal)))
    }

    /// Record a team's wager on the open daily double or final clue.
    ///
    /// Negative amounts are stored as 0. Final wagers lock once the team is
    /// judged.
    ///
    /// # Errors
    ///
    /// Rejected with no open clue, for clues that take no wagers, for
    /// unknown teams, or after the team's final verdict.
    pub fn record_wager(&mut self, team: &TeamId, amount: i64) -> Result<Step, Rejection> {
        let Phase::ClueOpen { clue, .. } = self.phase else {
            return Err(needs_open_clue("record_wager", self.phase));
        };
        if !self.is_wager_eligible(clue) {
            return Err(Rejection::NotWagerEligible(clue));
        }
        if self.scoreboard.team(team).is_none() {
            return Err(Rejection::UnknownTeam(team.clone()));
        }
        if clue.is_final() && self.final_results.contains(team) {
            return Err(Rejection::AlreadyJudged(team.clone()));
        }
        let stored = self.wagers.record(clue, team.clone(), amount);
        log::debug!("{team} wagers {stored} on {clue}");
        Ok(self.step(None))
    }

    /// Judge the active team on the open regular clue and close it.
    ///
    /// # Errors
    ///
    /// Rejected with no open clue, for the final clue, before the reveal,
    /// or for an unscored clue.
    pub fn judge(&mut self, outcome: JudgeOutcome) -> Result<Step, Rejection> {
        let Phase::ClueOpen { clue, revealed } = self.phase else {
            return Err(needs_open_clue("judge", self.phase));
        };
        if clue.is_final() {
            return Err(Rejection::FinalClueOpen);
        }
        if !revealed {
            return Err(Rejection::NotRevealed);
        }
        let value = self.score_value_of(clue);
        if value == 0 {
            return Err(Rejection::Unscored(clue));
        }

        let active = self.scoreboard.active_index();
        let cue = match outcome {
            JudgeOutcome::Correct => {
                self.scoreboard.apply_delta(active, value);
                Cue::Correct
            }
            JudgeOutcome::Incorrect => {
                self.scoreboard.apply_delta(active, -value);
                self.scoreboard.advance_turn();
                Cue::Incorrect
            }
            JudgeOutcome::NoResponse => Cue::Incorrect,
        };
        log::debug!(
            "{clue} judged {outcome:?} for team index {active} ({value} points)"
        );
        self.answered.insert(clue);
        self.phase = Phase::Board;
        self.refresh_final_offer();
        Ok(self.step(Some(cue)))
    }

    /// Close the open clue without judging; it stays on the board.
    ///
    /// # Errors
    ///
    /// Rejected when no clue is open.
    pub fn close_clue(&mut self) -> Result<Step, Rejection> {
        let Phase::ClueOpen { clue, .. } = self.phase else {
            return Err(needs_open_clue("close_clue", self.phase));
        };
        log::debug!("{clue} closed unanswered");
        self.phase = Phase::Board;
        self.refresh_final_offer();
        Ok(self.step(None))
    }

    /// Open the final clue from the final intro.
    ///
    /// # Errors
    ///
    /// Rejected outside the final intro or when the board has no final clue.
    pub fn open_final(&mut self) -> Result<Step, Rejection> {
        if self.phase != Phase::FinalIntro {
            return Err(wrong_phase("open_final", self.phase));
        }
        if !self.board.as_ref().is_some_and(Board::has_final) {
            return Err(Rejection::NoFinalClue);
        }
        log::info!("final clue opened");
        self.phase = Phase::ClueOpen {
            clue: ClueId::Final,
            revealed: false,
        };
        Ok(self.step(Some(Cue::Select)))
    }

    /// Settle one team's final wager.
    ///
    /// # Errors
    ///
    /// Rejected unless the final clue is open and revealed, for unknown
    /// teams, and for teams already judged.
    pub fn judge_final(&mut self, team: &TeamId, outcome: FinalOutcome) -> Result<Step, Rejection> {
        let Phase::ClueOpen { clue, revealed } = self.phase else {
            return Err(needs_open_clue("judge_final", self.phase));
        };
        if !clue.is_final() {
            return Err(Rejection::NotFinalClue);
        }
        if !revealed {
            return Err(Rejection::NotRevealed);
        }
        if self.scoreboard.team(team).is_none() {
            return Err(Rejection::UnknownTeam(team.clone()));
        }
        self.final_results.record(team.clone(), outcome)?;

        let wager = self.wagers.wager(ClueId::Final, team);
        let score = self.scoreboard.apply_delta(team, outcome.delta(wager));
        log::debug!("{team} final {outcome:?} on wager {wager}, score now {score:?}");
        let cue = match outcome {
            FinalOutcome::Correct => Cue::Correct,
            FinalOutcome::Incorrect => Cue::Incorrect,
        };
        Ok(self.step(Some(cue)))
    }

    /// End the final round and show the standings.
    ///
    /// Teams left unjudged keep their score.
    ///
    /// # Errors
    ///
    /// Rejected unless the final clue is open.
    pub fn finish_final(&mut self) -> Result<Step, Rejection> {
        let Phase::ClueOpen { clue, .. } = self.phase else {
            return Err(needs_open_clue("finish_final", self.phase));
        };
        if !clue.is_final() {
            return Err(Rejection::NotFinalClue);
        }
        let unjudged = self.scoreboard.len().saturating_sub(self.final_results.len());
        if unjudged > 0 {
            log::debug!("final finished with {unjudged} teams unjudged");
        }
        self.answered.insert(ClueId::Final);
        self.final_results.clear();
        self.phase = Phase::FinalStandings;
        if let Some(leader) = self.scoreboard.standings().first() {
            log::info!("game over: {} leads with {}", leader.name, leader.score);
        }
        Ok(self.step(Some(Cue::GameEnd)))
    }

    // ----------------------------------------------------------------------
    // Operator shortcuts

    /// Mark every grid clue answered except the last one in board order and
    /// close whatever grid clue is open.
    ///
    /// # Errors
    ///
    /// Rejected without a board, and outside the grid phases (including
    /// while the final clue is open).
    pub fn debug_fast_forward(&mut self) -> Result<Step, Rejection> {
        let board = self.board.as_ref().ok_or(Rejection::NoBoard)?;
        match self.phase {
            Phase::Board | Phase::DailyDoubleIntro { .. } => {}
            Phase::ClueOpen { clue, .. } if !clue.is_final() => {}
            other => return Err(wrong_phase("debug_fast_forward", other)),
        }
        let ids: Vec<ClueId> = board.clue_ids().collect();
        let Some((last, rest)) = ids.split_last() else {
            return Err(Rejection::NoBoard);
        };
        self.answered.extend(rest.iter().copied());
        self.phase = Phase::Board;
        log::debug!("fast-forwarded board, skipping {last}");
        self.refresh_final_offer();
        Ok(self.step(None))
    }

    /// Flip the display-only daily-double markers.
    ///
    /// # Errors
    ///
    /// Rejected without a board.
    pub fn toggle_daily_double_markers(&mut self) -> Result<Step, Rejection> {
        if self.board.is_none() {
            return Err(Rejection::NoBoard);
        }
        self.show_daily_double_markers = !self.show_daily_double_markers;
        Ok(self.step(None))
    }

    /// Return to team setup, keeping the board.
    pub fn reset(&mut self) -> Step {
        log::info!("session reset");
        self.clear_game();
        self.step(None)
    }

    // ----------------------------------------------------------------------
    // Clock

    /// Move the session clock forward and fire any transition that is due.
    pub fn advance_clock(&mut self, elapsed: Duration) -> Step {
        self.clock = self.clock.saturating_add(elapsed);
        if self.final_offer.fire_if_due(self.clock) && self.final_offer_eligible() {
            return self.auto_offer_final();
        }
        self.step(None)
    }

    fn auto_offer_final(&mut self) -> Step {
        log::info!("grid cleared; offering final clue");
        self.phase = Phase::FinalIntro;
        self.step(Some(Cue::FinalIntro))
    }

    /// Whether the final offer may be pending right now.
    fn final_offer_eligible(&self) -> bool {
        let Some(board) = self.board.as_ref() else {
            return false;
        };
        board.has_final()
            && self.phase == Phase::Board
            && !self.answered.contains(&ClueId::Final)
            && self.answered_grid_clues() >= board.total_clues()
    }

    /// Arm or cancel the final offer to match the current state.
    fn refresh_final_offer(&mut self) {
        if self.final_offer_eligible() {
            if !self.final_offer.is_pending() {
                let due = self.final_offer.arm(self.clock, self.config.final_offer_delay());
                log::debug!("final offer armed for {due:?}");
            }
        } else if self.final_offer.cancel() {
            log::debug!("final offer cancelled");
        }
    }

    fn clear_game(&mut self) {
        self.phase = Phase::TeamSetup;
        self.scoreboard.clear();
        self.answered.clear();
        self.daily_doubles.clear();
        self.wagers.clear();
        self.final_results.clear();
        self.final_offer.cancel();
    }

    fn step(&self, cue: Option<Cue>) -> Step {
        Step {
            phase: self.phase,
            cue,
        }
    }

    fn is_wager_eligible(&self, clue: ClueId) -> bool {
        clue.is_final() || self.daily_doubles.contains(clue)
    }

    fn score_value_of(&self, clue: ClueId) -> i64 {
        let points = self
            .board
            .as_ref()
            .and_then(|board| board.clue(clue))
            .map_or(0, |c| i64::from(c.points()));
        if self.daily_doubles.contains(clue) {
            points * DAILY_DOUBLE_MULTIPLIER
        } else {
            points
        }
    }

    fn answered_grid_clues(&self) -> usize {
        self.answered.iter().filter(|id| !id.is_final()).count()
    }

    // ----------------------------------------------------------------------
    // Queries

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn scoreboard(&self) -> &ScoreBoard {
        &self.scoreboard
    }

    #[must_use]
    pub fn teams(&self) -> &[Team] {
        self.scoreboard.teams()
    }

    #[must_use]
    pub const fn active_team_index(&self) -> usize {
        self.scoreboard.active_index()
    }

    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        self.scoreboard.standings()
    }

    #[must_use]
    pub const fn answered(&self) -> &BTreeSet<ClueId> {
        &self.answered
    }

    #[must_use]
    pub fn is_answered(&self, id: ClueId) -> bool {
        self.answered.contains(&id)
    }

    /// Grid clues not yet answered.
    #[must_use]
    pub fn remaining_clues(&self) -> usize {
        self.board
            .as_ref()
            .map_or(0, |board| board.total_clues().saturating_sub(self.answered_grid_clues()))
    }

    #[must_use]
    pub const fn daily_doubles(&self) -> &DailyDoubleMap {
        &self.daily_doubles
    }

    #[must_use]
    pub const fn wagers(&self) -> &WagerLedger {
        &self.wagers
    }

    #[must_use]
    pub const fn final_results(&self) -> &FinalResults {
        &self.final_results
    }

    #[must_use]
    pub const fn open_clue(&self) -> Option<ClueId> {
        self.phase.open_clue()
    }

    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.phase.is_revealed()
    }

    #[must_use]
    pub const fn pending_daily_double(&self) -> Option<ClueId> {
        match self.phase {
            Phase::DailyDoubleIntro { pending } => Some(pending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn show_daily_double_markers(&self) -> bool {
        self.show_daily_double_markers
    }

    /// Whether the open clue is a daily double.
    #[must_use]
    pub fn is_daily_double_open(&self) -> bool {
        self.open_clue()
            .is_some_and(|clue| self.daily_doubles.contains(clue))
    }

    /// Points at stake on the open regular clue, doubled for daily doubles.
    #[must_use]
    pub fn score_value(&self) -> Option<i64> {
        self.open_clue()
            .filter(|clue| !clue.is_final())
            .map(|clue| self.score_value_of(clue))
    }

    /// Wager `team` has on the open clue, 0 if none.
    #[must_use]
    pub fn wager_for(&self, team: &TeamId) -> i64 {
        self.open_clue()
            .map_or(0, |clue| self.wagers.wager(clue, team))
    }

    #[must_use]
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    /// Session time at which the final intro will be offered.
    #[must_use]
    pub const fn final_offer_due(&self) -> Option<Duration> {
        self.final_offer.due_at()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loads.is_loading()
    }

    /// Grid cell state for rendering.
    #[must_use]
    pub fn cell(&self, category: usize, clue: usize) -> Option<CellView> {
        let board = self.board.as_ref()?;
        let entry = board.clue_at(category, clue)?;
        let id = ClueId::grid(category, clue);
        Some(CellView {
            id,
            value: entry.points(),
            answered: self.answered.contains(&id),
            daily_double_marker: self.show_daily_double_markers && self.daily_doubles.contains(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Category, Clue, FinalClue};
    use crate::cue::{CueLog, Muted};

    fn clue(value: Option<u32>, text: &str) -> Clue {
        Clue {
            value,
            text: text.to_string(),
            answer: format!("{text} answer"),
            reference: None,
            href: None,
        }
    }

    fn board(with_final: bool) -> Board {
        Board {
            title: "Session".to_string(),
            subtitle: None,
            categories: vec![
                Category {
                    name: "Alpha".to_string(),
                    hint: None,
                    clues: vec![clue(Some(100), "a0"), clue(Some(200), "a1")],
                },
                Category {
                    name: "Beta".to_string(),
                    hint: None,
                    clues: vec![clue(Some(100), "b0"), clue(None, "b1")],
                },
            ],
            final_clue: with_final.then(|| FinalClue {
                category: "Last".to_string(),
                text: "final".to_string(),
                answer: "answer".to_string(),
                reference: None,
                href: None,
            }),
        }
    }

    fn started(with_final: bool) -> GameSession {
        let mut session = GameSession::with_board(board(with_final), SessionConfig::default()).unwrap();
        session.start_game(2).unwrap();
        session.daily_doubles = DailyDoubleMap::default();
        session
    }

    #[test]
    fn start_game_requires_board_and_valid_count() {
        let mut empty = GameSession::default();
        assert_eq!(empty.start_game(2), Err(Rejection::NoBoard));

        let mut session = GameSession::with_board(board(true), SessionConfig::default()).unwrap();
        assert_eq!(session.start_game(1), Err(Rejection::TeamCountOutOfRange(1)));
        assert_eq!(session.start_game(7), Err(Rejection::TeamCountOutOfRange(7)));
        assert_eq!(session.phase(), Phase::TeamSetup);

        let step = session.start_game(6).unwrap();
        assert_eq!(step.phase, Phase::Board);
        assert_eq!(session.teams().len(), 6);
        assert_eq!(session.daily_doubles().len(), 2);
        assert!(matches!(
            session.start_game(2),
            Err(Rejection::WrongPhase { operation: "start_game", .. })
        ));
    }

    #[test]
    fn invalid_board_leaves_session_untouched() {
        let mut session = started(true);
        let mut bad = board(true);
        bad.categories[1].clues.clear();
        assert!(matches!(
            session.initialize(bad),
            Err(InvalidBoardError::EmptyCategory { index: 1, .. })
        ));
        assert_eq!(session.phase(), Phase::Board);
        assert_eq!(session.teams().len(), 2);
    }

    #[test]
    fn selection_is_single_slot() {
        let mut session = started(true);
        let step = session.select_clue(0, 0).unwrap();
        assert_eq!(step.cue, Some(Cue::Select));
        assert_eq!(
            session.select_clue(0, 1),
            Err(Rejection::ClueAlreadyOpen(ClueId::grid(0, 0)))
        );
        assert_eq!(session.open_clue(), Some(ClueId::grid(0, 0)));
    }

    #[test]
    fn unknown_and_answered_clues_are_rejected() {
        let mut session = started(true);
        assert_eq!(
            session.select_clue(4, 0),
            Err(Rejection::UnknownClue(ClueId::grid(4, 0)))
        );
        session.select_clue(0, 0).unwrap();
        session.reveal_answer().unwrap();
        session.judge(JudgeOutcome::Correct).unwrap();
        assert_eq!(
            session.select_clue(0, 0),
            Err(Rejection::AlreadyAnswered(ClueId::grid(0, 0)))
        );
    }

    #[test]
    fn reveal_happens_once() {
        let mut session = started(true);
        assert_eq!(session.reveal_answer(), Err(Rejection::NoClueOpen));
        session.select_clue(0, 1).unwrap();
        assert_eq!(session.reveal_answer().unwrap().cue, Some(Cue::Reveal));
        assert_eq!(session.reveal_answer(), Err(Rejection::AlreadyRevealed));
    }

    #[test]
    fn judge_requires_reveal_and_value() {
        let mut session = started(true);
        session.select_clue(1, 1).unwrap();
        assert_eq!(session.judge(JudgeOutcome::Correct), Err(Rejection::NotRevealed));
        session.reveal_answer().unwrap();
        assert_eq!(
            session.judge(JudgeOutcome::NoResponse),
            Err(Rejection::Unscored(ClueId::grid(1, 1)))
        );
        assert_eq!(session.open_clue(), Some(ClueId::grid(1, 1)));
        session.close_clue().unwrap();
        assert!(!session.is_answered(ClueId::grid(1, 1)));
        assert_eq!(session.phase(), Phase::Board);
    }

    #[test]
    fn incorrect_clamps_and_passes_turn() {
        let mut session = started(true);
        session.select_clue(0, 1).unwrap();
        session.reveal_answer().unwrap();
        let step = session.judge(JudgeOutcome::Incorrect).unwrap();
        assert_eq!(step.cue, Some(Cue::Incorrect));
        assert_eq!(session.teams()[0].score, 0);
        assert_eq!(session.active_team_index(), 1);
        assert!(session.is_answered(ClueId::grid(0, 1)));
        assert!(!session.is_revealed());
    }

    #[test]
    fn daily_double_goes_through_intro() {
        let mut session = started(true);
        session.daily_doubles = [ClueId::grid(0, 1)].into_iter().collect();
        let step = session.select_clue(0, 1).unwrap();
        assert_eq!(step.cue, Some(Cue::DailyDouble));
        assert_eq!(session.pending_daily_double(), Some(ClueId::grid(0, 1)));
        assert_eq!(session.open_clue(), None);
        assert_eq!(
            session.select_clue(0, 0),
            Err(Rejection::WrongPhase {
                operation: "select_clue",
                phase: "daily double intro"
            })
        );

        let step = session.confirm_daily_double().unwrap();
        assert_eq!(step.cue, None);
        assert_eq!(session.open_clue(), Some(ClueId::grid(0, 1)));
        assert_eq!(session.score_value(), Some(400));
        assert!(session.is_daily_double_open());
    }

    #[test]
    fn dismissed_daily_double_stays_playable() {
        let mut session = started(true);
        session.daily_doubles = [ClueId::grid(1, 0)].into_iter().collect();
        session.select_clue(1, 0).unwrap();
        session.dismiss_daily_double().unwrap();
        assert_eq!(session.phase(), Phase::Board);
        assert!(!session.is_answered(ClueId::grid(1, 0)));
        assert_eq!(session.select_clue(1, 0).unwrap().cue, Some(Cue::DailyDouble));
    }

    #[test]
    fn wagers_only_on_bonus_clues() {
        let mut session = started(true);
        let team = TeamId::for_position(1);
        session.select_clue(0, 0).unwrap();
        assert_eq!(
            session.record_wager(&team, 100),
            Err(Rejection::NotWagerEligible(ClueId::grid(0, 0)))
        );
        session.close_clue().unwrap();

        session.daily_doubles = [ClueId::grid(0, 1)].into_iter().collect();
        session.select_clue(0, 1).unwrap();
        session.confirm_daily_double().unwrap();
        session.record_wager(&team, -30).unwrap();
        assert_eq!(session.wager_for(&team), 0);
        session.record_wager(&team, 500).unwrap();
        assert_eq!(session.wager_for(&team), 500);
        assert_eq!(
            session.record_wager(&TeamId::from("team-9"), 5),
            Err(Rejection::UnknownTeam(TeamId::from("team-9")))
        );

        // Daily double rewards stay at twice face value regardless of wager.
        session.reveal_answer().unwrap();
        session.judge(JudgeOutcome::Correct).unwrap();
        assert_eq!(session.teams()[0].score, 400);
    }

    #[test]
    fn markers_only_show_when_toggled() {
        let mut session = started(true);
        session.daily_doubles = [ClueId::grid(0, 0)].into_iter().collect();
        assert!(!session.cell(0, 0).unwrap().daily_double_marker);
        session.toggle_daily_double_markers().unwrap();
        let cell = session.cell(0, 0).unwrap();
        assert!(cell.daily_double_marker);
        assert_eq!(cell.value, 100);
        assert!(!session.cell(0, 1).unwrap().daily_double_marker);
        assert!(session.cell(3, 0).is_none());
    }

    #[test]
    fn reset_clears_game_but_keeps_board() {
        let mut session = started(true);
        session.select_clue(0, 0).unwrap();
        session.reveal_answer().unwrap();
        session.judge(JudgeOutcome::Correct).unwrap();
        session.reset();
        assert_eq!(session.phase(), Phase::TeamSetup);
        assert!(session.answered().is_empty());
        assert!(session.teams().is_empty());
        assert!(session.daily_doubles().is_empty());
        assert!(session.board().is_some());
        assert_eq!(session.active_team_index(), 0);
    }

    #[test]
    fn steps_forward_cues_to_sink() {
        let mut session = started(true);
        let mut log = CueLog::default();
        session.select_clue(0, 0).unwrap().forward_to(&mut log);
        session.reveal_answer().unwrap().forward_to(&mut log);
        session.judge(JudgeOutcome::NoResponse).unwrap().forward_to(&mut log);
        assert_eq!(log.cues(), [Cue::Select, Cue::Reveal, Cue::Incorrect]);

        session.select_clue(0, 1).unwrap().forward_to(&mut Muted);
        assert_eq!(log.cues().len(), 3);
    }

    #[test]
    fn stale_load_is_discarded() {
        let mut session = GameSession::default();
        let first = session.begin_load();
        let second = session.begin_load();
        assert_eq!(
            session.complete_load(first, Ok(board(true))).err(),
            Some(Rejection::StaleLoad(first.id()))
        );
        assert!(session.board().is_none());
        assert!(matches!(
            session.complete_load(second, Ok(board(false))),
            Ok(LoadCompletion::Applied)
        ));
        assert!(!session.board().is_some_and(Board::has_final));

        let third = session.begin_load();
        session.teardown();
        assert!(session.complete_load(third, Ok(board(true))).is_err());
        assert!(!session.board().is_some_and(Board::has_final));
    }

    #[test]
    fn failed_load_leaves_no_board() {
        let mut session = GameSession::with_board(board(true), SessionConfig::default()).unwrap();
        let ticket = session.begin_load();
        let outcome = session
            .complete_load(ticket, Err(LoadError::Unavailable("offline".to_string())))
            .unwrap();
        assert!(matches!(outcome, LoadCompletion::Failed(LoadError::Unavailable(_))));
        assert!(session.board().is_none());
        assert_eq!(session.start_game(2), Err(Rejection::NoBoard));
    }
}
