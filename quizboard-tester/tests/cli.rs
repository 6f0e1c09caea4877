use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "quizboard-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_quizboard-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("daily-double"));
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_quizboard-tester");
    let output_path = temp_path("all");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "all",
            "--seeds",
            "1,0x2a",
            "--teams",
            "2",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Quizboard Session Tester"));

    let report = std::fs::read_to_string(output_path).expect("read report");
    let results: serde_json::Value = serde_json::from_str(&report).expect("json report");
    let results = results.as_array().expect("array of results");
    assert!(results.len() >= 10);
    assert!(results.iter().all(|r| r["passed"] == true));
    assert!(results.iter().all(|r| r["seeds_run"] == 2));
}

#[test]
fn cli_fails_on_missing_board() {
    let exe = env!("CARGO_BIN_EXE_quizboard-tester");
    let output = Command::new(exe)
        .args(["--board"])
        .arg(temp_path("missing-board.json"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load board"));
}

#[test]
fn cli_exits_nonzero_when_script_is_rejected() {
    let exe = env!("CARGO_BIN_EXE_quizboard-tester");
    let script_path = temp_path("script.txt");
    std::fs::write(&script_path, "start 2\nreveal\n").expect("write script");
    let output_path = temp_path("script-report.md");
    let output = Command::new(exe)
        .args(["--scenarios", "smoke", "--report", "markdown", "--script"])
        .arg(&script_path)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let report = std::fs::read_to_string(output_path).expect("read report");
    assert!(report.contains("# Quizboard Session Test Results"));
    assert!(report.contains("action 2: no clue is open"));
}
