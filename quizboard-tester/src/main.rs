mod board_source;
mod reports;
mod runner;
mod scenario;
mod script;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use quizboard_game::{Board, GameSession, SessionConfig};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use board_source::FileBoardLoader;
use runner::{ScenarioResult, ScenarioRunner};
use scenario::{all_keys, get_scenario, list_scenarios};
use script::parse_script;

#[derive(Debug, Parser)]
#[command(name = "quizboard-tester", version)]
#[command(about = "Scripted QA runs for the Quizboard session engine")]
struct Args {
    /// Board document to play (defaults to the bundled sample board)
    #[arg(long)]
    board: Option<PathBuf>,

    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x-prefixed hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of teams in each game
    #[arg(long, default_value_t = 3)]
    teams: usize,

    /// Action script to replay after the scenarios
    #[arg(long)]
    script: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let loader = FileBoardLoader::new(args.board.clone());
    let board = load_board(&loader)?;
    println!(
        "📋 Board: {} ({} clues) from {}",
        board.title.bright_white(),
        board.total_clues(),
        loader.describe()
    );
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let scenarios = expand_scenarios(&args.scenarios);

    let runner = ScenarioRunner::new(args.teams, args.verbose);
    let mut results = run_scenarios(&runner, &board, &scenarios, &seeds);
    if let Some(path) = &args.script {
        results.push(run_script_file(&runner, &board, path, &seeds)?);
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎯 Quizboard Session Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

/// Load through the session's load guard so the board goes through the same
/// validation a host would apply.
fn load_board(loader: &FileBoardLoader) -> Result<Board> {
    let mut session = GameSession::new(SessionConfig::default());
    session
        .load_from(loader)
        .with_context(|| format!("failed to load board from {}", loader.describe()))?;
    session
        .board()
        .cloned()
        .context("board missing after successful load")
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let seeds = tokens
        .iter()
        .map(|token| {
            let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => token.parse::<u64>(),
            };
            parsed.with_context(|| format!("invalid seed {token:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in all_keys() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn run_scenarios(
    runner: &ScenarioRunner,
    board: &Board,
    scenarios: &[String],
    seeds: &[u64],
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Session Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.push(runner.run_scenario(&scenario, board, seeds));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn run_script_file(
    runner: &ScenarioRunner,
    board: &Board,
    path: &Path,
    seeds: &[u64],
) -> Result<ScenarioResult> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let actions =
        parse_script(&source).with_context(|| format!("invalid script {}", path.display()))?;
    let seed = seeds.first().copied().unwrap_or_default();
    let label = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(runner.run_script(&label, board, &actions, seed))
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Quizboard Session Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if args.report != "json" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
