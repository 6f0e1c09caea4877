use anyhow::{Context, Result, bail, ensure};
use quizboard_game::{
    ClueId, Cue, CueLog, FinalOutcome, GameSession, JudgeOutcome, Phase, Rejection, TeamId,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{
    ScenarioCtx, TestScenario, board, clear_board, expect_phase, judge_open, millis,
    open_and_reveal, reach_final_intro, record, scored_clues,
};

pub(super) const SCENARIOS: &[TestScenario] = &[
    TestScenario {
        key: "smoke",
        name: "Smoke",
        description: "Start a game and score one clue",
        run: smoke,
    },
    TestScenario {
        key: "turn-order",
        name: "Turn Order",
        description: "Incorrect answers pass the turn; no response keeps it",
        run: turn_order,
    },
    TestScenario {
        key: "daily-double",
        name: "Daily Double",
        description: "Intro, dismissal and doubled scoring of a daily double",
        run: daily_double,
    },
    TestScenario {
        key: "fast-forward",
        name: "Fast Forward",
        description: "Debug fast-forward leaves exactly the last clue open",
        run: fast_forward,
    },
    TestScenario {
        key: "final-offer-timer",
        name: "Final Offer Timer",
        description: "Final intro appears only after the full delay",
        run: final_offer_timer,
    },
    TestScenario {
        key: "final-wagers",
        name: "Final Wagers",
        description: "Final wagers settle into score-ordered standings",
        run: final_wagers,
    },
    TestScenario {
        key: "full-game",
        name: "Full Game",
        description: "Seeded play of every clue through the final standings",
        run: full_game,
    },
    TestScenario {
        key: "reset",
        name: "Reset",
        description: "Reset returns to team setup and keeps the board",
        run: reset,
    },
    TestScenario {
        key: "rejections",
        name: "Rejections",
        description: "Out-of-phase operations are refused without side effects",
        run: rejections,
    },
    TestScenario {
        key: "markers",
        name: "Daily Double Markers",
        description: "Marker toggle exposes daily doubles on the grid",
        run: markers,
    },
];

fn start(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    record(session.start_game(ctx.teams)?, cues);
    expect_phase(session, Phase::Board)
}

fn score_of(session: &GameSession, team: &TeamId) -> Result<i64> {
    session
        .scoreboard()
        .team(team)
        .map(|t| t.score)
        .with_context(|| format!("{team} missing from scoreboard"))
}

fn smoke(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    ensure!(session.teams().len() == ctx.teams, "wrong roster size");
    let first = *scored_clues(board(session)?)
        .first()
        .context("board has no scored clues")?;
    let points = open_and_reveal(session, first, cues)?;
    judge_open(session, JudgeOutcome::Correct, cues)?;
    ensure!(session.teams()[0].score == points, "correct answer not credited");
    ensure!(session.is_answered(first), "{first} not marked answered");
    ensure!(cues.last() == Some(Cue::Correct), "missing correct cue");
    Ok(())
}

fn turn_order(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    let clues = scored_clues(board(session)?);
    ensure!(
        clues.len() > ctx.teams,
        "need more than {} scored clues",
        ctx.teams
    );
    for (round, id) in clues.iter().take(ctx.teams).enumerate() {
        open_and_reveal(session, *id, cues)?;
        judge_open(session, JudgeOutcome::Incorrect, cues)?;
        let expected = (round + 1) % ctx.teams;
        ensure!(
            session.active_team_index() == expected,
            "turn at {} after round {round}, expected {expected}",
            session.active_team_index()
        );
    }
    ensure!(session.active_team_index() == 0, "turn did not wrap");
    ensure!(
        session.teams().iter().all(|t| t.score == 0),
        "scores went below zero or were credited"
    );

    open_and_reveal(session, clues[ctx.teams], cues)?;
    judge_open(session, JudgeOutcome::NoResponse, cues)?;
    ensure!(session.active_team_index() == 0, "no response moved the turn");
    Ok(())
}

fn daily_double(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    let board = board(session)?;
    let target = session
        .daily_doubles()
        .iter()
        .find(|id| board.clue(*id).is_some_and(quizboard_game::Clue::is_scored))
        .context("no scored daily double on this board")?;
    let face = board.clue(target).map_or(0, |c| i64::from(c.points()));
    let ClueId::Grid { category, clue } = target else {
        bail!("daily double {target} is not on the grid");
    };

    let step = record(session.select_clue(category, clue)?, cues);
    ensure!(step.cue == Some(Cue::DailyDouble), "missing daily double cue");
    ensure!(
        session.pending_daily_double() == Some(target),
        "intro is not holding {target}"
    );
    record(session.dismiss_daily_double()?, cues);
    ensure!(!session.is_answered(target), "dismissal answered the clue");

    let points = open_and_reveal(session, target, cues)?;
    ensure!(points == face * 2, "daily double worth {points}, expected {}", face * 2);
    let team = session
        .scoreboard()
        .active_team()
        .map(|t| t.id.clone())
        .context("no active team")?;
    record(session.record_wager(&team, 1_000_000)?, cues);
    ensure!(session.wager_for(&team) == 1_000_000, "wager not recorded");
    judge_open(session, JudgeOutcome::Correct, cues)?;
    ensure!(score_of(session, &team)? == face * 2, "wager leaked into scoring");
    Ok(())
}

fn fast_forward(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    let last = board(session)?
        .clue_ids()
        .last()
        .context("board has no clues")?;
    record(session.debug_fast_forward()?, cues);
    ensure!(session.remaining_clues() == 1, "expected exactly one clue left");
    ensure!(!session.is_answered(last), "{last} should remain open");
    ensure!(session.final_offer_due().is_none(), "final offer armed early");
    Ok(())
}

fn final_offer_timer(
    session: &mut GameSession,
    ctx: &ScenarioCtx,
    cues: &mut CueLog,
) -> Result<()> {
    start(session, ctx, cues)?;
    ensure!(board(session)?.has_final(), "board has no final clue");
    clear_board(session, cues)?;
    let delay = session.config().final_offer_delay_ms;
    let due = session.final_offer_due().context("final offer not armed")?;
    ensure!(due == session.clock() + millis(delay), "final offer due at {due:?}");

    let step = record(session.advance_clock(millis(delay.saturating_sub(1))), cues);
    ensure!(step.phase == Phase::Board, "final offer fired early");
    let step = record(session.advance_clock(millis(1)), cues);
    ensure!(step.phase == Phase::FinalIntro, "final offer did not fire");
    ensure!(step.cue == Some(Cue::FinalIntro), "missing final intro cue");
    Ok(())
}

fn final_wagers(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    let leader = TeamId::for_position(1);
    let trailer = TeamId::for_position(2);

    let first = *scored_clues(board(session)?)
        .first()
        .context("board has no scored clues")?;
    open_and_reveal(session, first, cues)?;
    judge_open(session, JudgeOutcome::Correct, cues)?;
    reach_final_intro(session, cues)?;

    record(session.open_final()?, cues);
    record(session.record_wager(&leader, 200)?, cues);
    record(session.record_wager(&trailer, 150)?, cues);
    let leader_before = score_of(session, &leader)?;
    let trailer_before = score_of(session, &trailer)?;

    record(session.reveal_answer()?, cues);
    record(session.judge_final(&leader, FinalOutcome::Correct)?, cues);
    record(session.judge_final(&trailer, FinalOutcome::Incorrect)?, cues);
    ensure!(
        matches!(
            session.judge_final(&leader, FinalOutcome::Incorrect),
            Err(Rejection::AlreadyJudged(_))
        ),
        "team judged twice"
    );

    let step = record(session.finish_final()?, cues);
    ensure!(step.phase == Phase::FinalStandings, "not on standings");
    ensure!(cues.last() == Some(Cue::GameEnd), "missing game end cue");
    ensure!(score_of(session, &leader)? == leader_before + 200, "leader not credited");
    ensure!(
        score_of(session, &trailer)? == (trailer_before - 150).max(0),
        "trailer not debited"
    );
    let standings = session.standings();
    ensure!(
        standings.windows(2).all(|w| w[0].score >= w[1].score),
        "standings out of order"
    );
    Ok(())
}

fn full_game(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(ctx.seed);
    start(session, ctx, cues)?;

    let all: Vec<ClueId> = board(session)?.clue_ids().collect();
    for id in all {
        let points = open_and_reveal(session, id, cues)?;
        if points == 0 {
            record(session.close_clue()?, cues);
            continue;
        }
        let outcome = match rng.gen_range(0..3) {
            0 => JudgeOutcome::Correct,
            1 => JudgeOutcome::Incorrect,
            _ => JudgeOutcome::NoResponse,
        };
        judge_open(session, outcome, cues)?;
        ensure!(
            session.teams().iter().all(|t| t.score >= 0),
            "negative score after {id}"
        );
    }
    if session.remaining_clues() > 0 {
        // Unscored clues can only be cleared by fast-forward.
        record(session.debug_fast_forward()?, cues);
        ensure!(session.remaining_clues() == 0, "board ends on an unscored clue");
    }
    if ctx.verbose {
        println!("   board cleared with {} cues", cues.cues().len());
    }
    if !board(session)?.has_final() {
        return Ok(());
    }

    let delay = session.config().final_offer_delay();
    record(session.advance_clock(delay), cues);
    expect_phase(session, Phase::FinalIntro)?;
    record(session.open_final()?, cues);
    let roster: Vec<(TeamId, i64)> = session
        .teams()
        .iter()
        .map(|t| (t.id.clone(), t.score))
        .collect();
    for (team, score) in &roster {
        record(session.record_wager(team, rng.gen_range(0..=*score))?, cues);
    }
    record(session.reveal_answer()?, cues);
    for (team, _) in &roster {
        let outcome = if rng.gen_bool(0.5) {
            FinalOutcome::Correct
        } else {
            FinalOutcome::Incorrect
        };
        record(session.judge_final(team, outcome)?, cues);
    }
    ensure!(
        session
            .final_results()
            .covers(roster.iter().map(|(team, _)| team)),
        "not every team was judged"
    );
    record(session.finish_final()?, cues);
    expect_phase(session, Phase::FinalStandings)?;
    ensure!(
        session.teams().iter().all(|t| t.score >= 0),
        "negative score after final"
    );
    Ok(())
}

fn reset(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    let first = *scored_clues(board(session)?)
        .first()
        .context("board has no scored clues")?;
    open_and_reveal(session, first, cues)?;
    record(session.reset(), cues);
    expect_phase(session, Phase::TeamSetup)?;
    ensure!(session.teams().is_empty(), "teams survived reset");
    ensure!(session.answered().is_empty(), "answered set survived reset");
    ensure!(session.board().is_some(), "reset dropped the board");
    start(session, ctx, cues)?;
    ensure!(!session.is_answered(first), "{first} still answered");
    Ok(())
}

fn rejections(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    ensure!(session.reveal_answer().is_err(), "reveal accepted during setup");
    ensure!(
        session.start_game(1) == Err(Rejection::TeamCountOutOfRange(1)),
        "one-team game accepted"
    );
    start(session, ctx, cues)?;

    let before = serde_json::to_string(&*session)?;
    let attempts = [
        session.reveal_answer().err(),
        session.judge(JudgeOutcome::Correct).err(),
        session.open_final().err(),
        session.finish_final().err(),
        session.confirm_daily_double().err(),
        session.select_clue(99, 0).err(),
        session.start_game(ctx.teams).err(),
        session
            .judge_final(&TeamId::for_position(1), FinalOutcome::Correct)
            .err(),
    ];
    for (index, attempt) in attempts.iter().enumerate() {
        ensure!(attempt.is_some(), "attempt {index} was accepted");
    }
    ensure!(
        serde_json::to_string(&*session)? == before,
        "a rejected operation changed the session"
    );
    Ok(())
}

fn markers(session: &mut GameSession, ctx: &ScenarioCtx, cues: &mut CueLog) -> Result<()> {
    start(session, ctx, cues)?;
    let rows = board(session)?.max_clues_per_category();
    let columns = board(session)?.categories.len();
    let marked = |session: &GameSession| {
        (0..columns)
            .flat_map(|c| (0..rows).map(move |q| (c, q)))
            .filter_map(|(c, q)| session.cell(c, q))
            .filter(|cell| cell.daily_double_marker)
            .count()
    };
    ensure!(marked(&*session) == 0, "markers visible before toggle");
    record(session.toggle_daily_double_markers()?, cues);
    ensure!(
        marked(&*session) == session.daily_doubles().len(),
        "marker count does not match daily doubles"
    );
    record(session.toggle_daily_double_markers()?, cues);
    ensure!(marked(&*session) == 0, "markers still visible");
    Ok(())
}
