use anyhow::{Context, Result, bail, ensure};
use quizboard_game::{Board, ClueId, Cue, CueLog, GameSession, JudgeOutcome, Phase, Step};
use std::time::Duration;

mod catalog;

/// Per-run inputs handed to a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub teams: usize,
    pub verbose: bool,
}

pub type ScenarioFn = fn(&mut GameSession, &ScenarioCtx, &mut CueLog) -> Result<()>;

/// A named scripted check against a live session.
#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let key = key.to_lowercase();
    catalog::SCENARIOS.iter().copied().find(|s| s.key == key)
}

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    catalog::SCENARIOS.iter().map(|s| (s.key, s.description))
}

pub fn all_keys() -> impl Iterator<Item = &'static str> {
    catalog::SCENARIOS.iter().map(|s| s.key)
}

// Shared steps used by the catalog.

fn board(session: &GameSession) -> Result<&Board> {
    session.board().context("session has no board")
}

fn expect_phase(session: &GameSession, expected: Phase) -> Result<()> {
    ensure!(
        session.phase() == expected,
        "expected phase {}, found {}",
        expected.name(),
        session.phase().name()
    );
    Ok(())
}

fn record(step: Step, cues: &mut CueLog) -> Step {
    step.forward_to(cues);
    step
}

/// Grid clues that carry points, in board order.
fn scored_clues(board: &Board) -> Vec<ClueId> {
    board
        .clue_ids()
        .filter(|id| board.clue(*id).is_some_and(quizboard_game::Clue::is_scored))
        .collect()
}

/// Select and reveal `id`, stepping through a daily double intro if one is
/// hit. Returns the points at stake.
fn open_and_reveal(session: &mut GameSession, id: ClueId, cues: &mut CueLog) -> Result<i64> {
    let ClueId::Grid { category, clue } = id else {
        bail!("{id} is not a grid clue");
    };
    let step = record(session.select_clue(category, clue)?, cues);
    if step.cue == Some(Cue::DailyDouble) {
        record(session.confirm_daily_double()?, cues);
    }
    record(session.reveal_answer()?, cues);
    session
        .score_value()
        .with_context(|| format!("no score value while {id} is open"))
}

fn judge_open(
    session: &mut GameSession,
    outcome: JudgeOutcome,
    cues: &mut CueLog,
) -> Result<Step> {
    Ok(record(session.judge(outcome)?, cues))
}

/// Fast-forward, then play the one clue it leaves behind.
fn clear_board(session: &mut GameSession, cues: &mut CueLog) -> Result<()> {
    record(session.debug_fast_forward()?, cues);
    let left = board(session)?
        .clue_ids()
        .find(|id| !session.is_answered(*id));
    if let Some(last) = left {
        let points = open_and_reveal(session, last, cues)?;
        ensure!(points > 0, "last clue {last} is unscored; the board cannot be completed");
        judge_open(session, JudgeOutcome::NoResponse, cues)?;
    }
    ensure!(session.remaining_clues() == 0, "board still has clues left");
    Ok(())
}

/// Clear the board and let the final offer fire.
fn reach_final_intro(session: &mut GameSession, cues: &mut CueLog) -> Result<()> {
    ensure!(board(session)?.has_final(), "board has no final clue");
    clear_board(session, cues)?;
    let delay = session.config().final_offer_delay();
    record(session.advance_clock(delay), cues);
    expect_phase(session, Phase::FinalIntro)
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
