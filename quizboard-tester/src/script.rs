//! Plain-text action scripts.
//!
//! One command per line; `#` starts a comment.
//!
//! ```text
//! start 3
//! select c0-q1
//! reveal
//! judge incorrect
//! wager team-2 500
//! final team-2 correct
//! advance 3000
//! ```
use quizboard_game::{Action, ClueId, FinalOutcome, JudgeOutcome, TeamId};
use regex::Regex;
use thiserror::Error;

const COMMAND_PATTERN: &str = r"^(?P<verb>[a-z][a-z-]*)(?:\s+(?P<args>.+?))?\s*$";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("invalid command pattern: {0}")]
    Pattern(String),
    #[error("line {line}: cannot parse {text:?}")]
    Malformed { line: usize, text: String },
    #[error("line {line}: unknown command {verb:?}")]
    UnknownCommand { line: usize, verb: String },
    #[error("line {line}: {verb} expects {expected}")]
    BadArguments {
        line: usize,
        verb: String,
        expected: &'static str,
    },
}

/// Parse a script into session actions.
///
/// # Errors
///
/// Returns the first line that is malformed, names an unknown command, or
/// carries the wrong arguments.
pub fn parse_script(source: &str) -> Result<Vec<Action>, ScriptError> {
    let command = Regex::new(COMMAND_PATTERN).map_err(|e| ScriptError::Pattern(e.to_string()))?;
    let mut actions = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let Some(caps) = command.captures(text) else {
            return Err(ScriptError::Malformed {
                line,
                text: text.to_string(),
            });
        };
        let verb = &caps["verb"];
        let args: Vec<&str> = caps
            .name("args")
            .map(|m| m.as_str().split_whitespace().collect())
            .unwrap_or_default();
        actions.push(parse_command(line, verb, &args)?);
    }
    Ok(actions)
}

fn parse_command(line: usize, verb: &str, args: &[&str]) -> Result<Action, ScriptError> {
    let bad = |expected: &'static str| ScriptError::BadArguments {
        line,
        verb: verb.to_string(),
        expected,
    };
    let action = match (verb, args) {
        ("start", [teams]) => Action::StartGame {
            teams: teams.parse().map_err(|_| bad("a team count"))?,
        },
        ("select", [id]) => match id.parse::<ClueId>() {
            Ok(ClueId::Grid { category, clue }) => Action::SelectClue { category, clue },
            _ => return Err(bad("a grid clue id like c0-q1")),
        },
        ("select", [category, clue]) => Action::SelectClue {
            category: category.parse().map_err(|_| bad("category and clue indexes"))?,
            clue: clue.parse().map_err(|_| bad("category and clue indexes"))?,
        },
        ("confirm", []) => Action::ConfirmDailyDouble,
        ("dismiss", []) => Action::DismissDailyDouble,
        ("reveal", []) => Action::RevealAnswer,
        ("wager", [team, amount]) => Action::RecordWager {
            team: TeamId::from(*team),
            amount: amount.parse().map_err(|_| bad("a team id and an amount"))?,
        },
        ("judge", [outcome]) => Action::Judge {
            outcome: parse_judge(outcome).ok_or_else(|| bad("correct, incorrect or no-response"))?,
        },
        ("final", [team, outcome]) => Action::JudgeFinal {
            team: TeamId::from(*team),
            outcome: parse_final(outcome).ok_or_else(|| bad("a team id and correct or incorrect"))?,
        },
        ("open-final", []) => Action::OpenFinal,
        ("finish", []) => Action::FinishFinal,
        ("close", []) => Action::CloseClue,
        ("fast-forward", []) => Action::DebugFastForward,
        ("markers", []) => Action::ToggleDailyDoubleMarkers,
        ("advance", [millis]) => Action::AdvanceClock {
            millis: millis
                .trim_end_matches("ms")
                .parse()
                .map_err(|_| bad("milliseconds"))?,
        },
        ("reset", []) => Action::Reset,
        (
            "start" | "select" | "confirm" | "dismiss" | "reveal" | "wager" | "judge" | "final"
            | "open-final" | "finish" | "close" | "fast-forward" | "markers" | "advance" | "reset",
            _,
        ) => return Err(bad("different arguments")),
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                verb: verb.to_string(),
            });
        }
    };
    Ok(action)
}

fn parse_judge(token: &str) -> Option<JudgeOutcome> {
    match token {
        "correct" => Some(JudgeOutcome::Correct),
        "incorrect" => Some(JudgeOutcome::Incorrect),
        "no-response" | "none" => Some(JudgeOutcome::NoResponse),
        _ => None,
    }
}

fn parse_final(token: &str) -> Option<FinalOutcome> {
    match token {
        "correct" => Some(FinalOutcome::Correct),
        "incorrect" => Some(FinalOutcome::Incorrect),
        _ => None,
    }
}
