use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::runner::ScenarioResult;

fn success_rate(results: &[ScenarioResult]) -> f64 {
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / results.len().max(1) as f64) * 100.0;
    rate
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Session Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "================================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{status} {}", result.scenario_name.bold())?;
        writeln!(
            out,
            "   Seeds: {}/{} successful",
            result.successful_seeds, result.seeds_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.standings.is_empty() {
            writeln!(out, "   Standings: {}", result.standings.join(", "))?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(out, "# Quizboard Session Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {status} {}\n", result.scenario_name)?;
        writeln!(
            out,
            "- **Seeds**: {}/{} successful",
            result.successful_seeds, result.seeds_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.standings.is_empty() {
            writeln!(out, "- **Standings**:")?;
            for line in &result.standings {
                writeln!(out, "  - {line}")?;
            }
        }
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Final Wagers".to_string(),
            passed,
            seeds_run: 2,
            successful_seeds: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["seed 7: leader not credited".to_string()]
            },
            standings: vec!["1. Team 1 (500)".to_string(), "2. Team 2 (0)".to_string()],
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
        }
    }

    #[test]
    fn markdown_lists_standings_and_failures() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &[sample(true), sample(false)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# Quizboard Session Test Results"));
        assert!(text.contains("- **Success rate**: 50.0%"));
        assert!(text.contains("  - 1. Team 1 (500)"));
        assert!(text.contains("leader not credited"));
    }

    #[test]
    fn console_report_handles_empty_results() {
        let mut out = Vec::new();
        generate_console_report(&mut out, &[], Duration::ZERO).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total scenarios: 0"));
        assert!(!text.contains("Performance Summary"));
    }

    #[test]
    fn json_report_is_an_array() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[sample(true)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["scenario_name"], "Final Wagers");
        assert_eq!(value[0]["standings"][1], "2. Team 2 (0)");
    }
}
