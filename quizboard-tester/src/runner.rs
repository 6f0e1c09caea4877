use colored::Colorize;
use quizboard_game::{Action, Board, CueLog, GameSession, SessionConfig};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::scenario::{ScenarioCtx, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub seeds_run: usize,
    pub successful_seeds: usize,
    pub failures: Vec<String>,
    /// Standings of the last run, e.g. `"1. Team 2 (400)"`.
    pub standings: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct ScenarioRunner {
    teams: usize,
    verbose: bool,
}

impl ScenarioRunner {
    pub const fn new(teams: usize, verbose: bool) -> Self {
        Self { teams, verbose }
    }

    /// Run `scenario` once per seed on a fresh session.
    pub fn run_scenario(&self, scenario: &TestScenario, board: &Board, seeds: &[u64]) -> ScenarioResult {
        if self.verbose {
            println!("🧪 Testing scenario: {}", scenario.name.bright_white());
        }

        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut standings = Vec::new();

        for &seed in seeds {
            let start_time = Instant::now();
            let config = SessionConfig::default().with_seed(seed);
            let outcome = GameSession::with_board(board.clone(), config)
                .map_err(anyhow::Error::from)
                .and_then(|mut session| {
                    let ctx = ScenarioCtx {
                        seed,
                        teams: self.teams,
                        verbose: self.verbose,
                    };
                    let mut cues = CueLog::default();
                    (scenario.run)(&mut session, &ctx, &mut cues)?;
                    Ok((session, cues))
                });

            match outcome {
                Ok((session, cues)) => {
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    standings = standing_lines(&session);
                    if self.verbose {
                        println!(
                            "  ✅ seed {seed} passed ({duration:?}), {} cues",
                            cues.cues().len()
                        );
                    }
                }
                Err(err) => {
                    log::debug!("{} failed for seed {seed}: {err:#}", scenario.key);
                    if self.verbose {
                        println!("  ❌ seed {seed} failed: {}", format!("{err:#}").red());
                    }
                    failures.push(format!("seed {seed}: {err:#}"));
                }
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            passed: failures.is_empty(),
            seeds_run: seeds.len(),
            successful_seeds: performance_data.len(),
            failures,
            standings,
            average_duration: average(&performance_data),
            performance_data,
        }
    }

    /// Replay a parsed action script; any rejected line fails the run.
    pub fn run_script(&self, label: &str, board: &Board, actions: &[Action], seed: u64) -> ScenarioResult {
        let start_time = Instant::now();
        let config = SessionConfig::default().with_seed(seed);
        let mut failures = Vec::new();
        let mut standings = Vec::new();

        match GameSession::replay(board.clone(), config, actions) {
            Ok((session, results)) => {
                for (index, (action, result)) in actions.iter().zip(&results).enumerate() {
                    match result {
                        Ok(step) if self.verbose => {
                            println!("  {:>3} {action:?} -> {}", index + 1, step.phase.name());
                        }
                        Ok(_) => {}
                        Err(rejection) => failures.push(format!("action {}: {rejection}", index + 1)),
                    }
                }
                standings = standing_lines(&session);
            }
            Err(err) => failures.push(err.to_string()),
        }

        let duration = start_time.elapsed();
        ScenarioResult {
            scenario_name: format!("Script {label}"),
            passed: failures.is_empty(),
            seeds_run: 1,
            successful_seeds: usize::from(failures.is_empty()),
            failures,
            standings,
            average_duration: duration,
            performance_data: vec![duration],
        }
    }
}

fn standing_lines(session: &GameSession) -> Vec<String> {
    session
        .standings()
        .iter()
        .map(|s| format!("{}. {} ({})", s.rank, s.name, s.score))
        .collect()
}

fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        Duration::ZERO
    } else {
        durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(u32::MAX)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u64>::deserialize(deserializer)?;
        Ok(millis.into_iter().map(Duration::from_millis).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_source::FileBoardLoader;
    use crate::scenario::get_scenario;
    use quizboard_game::BoardLoader;

    fn board() -> Board {
        FileBoardLoader::default().load_board().unwrap()
    }

    #[test]
    fn runs_scenario_for_each_seed() {
        let runner = ScenarioRunner::new(2, false);
        let scenario = get_scenario("final-wagers").unwrap();
        let result = runner.run_scenario(&scenario, &board(), &[1, 2, 3]);
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.seeds_run, 3);
        assert_eq!(result.successful_seeds, 3);
        assert_eq!(result.performance_data.len(), 3);
        assert_eq!(result.standings.len(), 2);
        assert!(result.standings[0].starts_with("1. Team 1"));
    }

    #[test]
    fn bad_roster_fails_every_seed() {
        let runner = ScenarioRunner::new(9, false);
        let scenario = get_scenario("smoke").unwrap();
        let result = runner.run_scenario(&scenario, &board(), &[5, 6]);
        assert!(!result.passed);
        assert_eq!(result.successful_seeds, 0);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("team count 9"));
    }

    #[test]
    fn script_rejections_become_failures() {
        let runner = ScenarioRunner::new(2, false);
        let actions = vec![
            Action::StartGame { teams: 2 },
            Action::RevealAnswer,
            Action::SelectClue { category: 0, clue: 0 },
        ];
        let result = runner.run_script("inline", &board(), &actions, 1);
        assert!(!result.passed);
        assert_eq!(result.failures, ["action 2: no clue is open"]);
        assert_eq!(result.standings.len(), 2);
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            passed: true,
            seeds_run: 1,
            successful_seeds: 1,
            failures: Vec::new(),
            standings: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.performance_data, [Duration::from_millis(12)]);
    }
}
