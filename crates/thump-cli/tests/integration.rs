//! Integration tests for thump-cli.
//!
//! Each test spawns the `thump` binary and checks its stdout.

use std::process::Command;

/// Helper to get the path to the `thump` binary built by cargo.
fn thump_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_thump"))
}

fn run_ok(args: &[&str]) -> String {
    let output = thump_bin()
        .args(args)
        .output()
        .expect("failed to run thump");
    assert!(
        output.status.success(),
        "thump {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// `thump wave`
// ---------------------------------------------------------------------------

#[test]
fn cli_wave_summary() {
    let stdout = run_ok(&["wave", "--shape", "square", "--pitch", "441", "--duration", "0.01"]);
    assert!(stdout.contains("Waveform: square"), "got:\n{stdout}");
    assert!(stdout.contains("Samples:     441"), "got:\n{stdout}");
    assert!(stdout.contains("Cycle:       100.00 samples"), "got:\n{stdout}");
}

#[test]
fn cli_wave_csv_has_one_row_per_sample() {
    let stdout = run_ok(&[
        "wave",
        "--shape",
        "triangle",
        "--pitch",
        "441",
        "--duration",
        "0.001",
        "--format",
        "csv",
    ]);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("index,value"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 44);
    assert_eq!(rows[0], "0,0");
    assert_eq!(rows[25], "25,1");
}

#[test]
fn cli_wave_json() {
    let stdout = run_ok(&[
        "wave",
        "--shape",
        "saw",
        "--sample-rate",
        "8000",
        "--pitch",
        "1000",
        "--duration",
        "0.002",
        "--volume",
        "0.5",
        "--format",
        "json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["shape"], "saw");
    assert_eq!(json["sample_rate"], 8000.0);
    let samples = json["samples"].as_array().unwrap();
    assert_eq!(samples.len(), 16);
    assert_eq!(samples[0].as_f64(), Some(-0.5));
}

#[test]
fn cli_wave_rejects_bad_sample_rate() {
    let output = thump_bin()
        .args(["wave", "--sample-rate", "0"])
        .output()
        .expect("failed to run thump");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sample_rate"), "got: {stderr}");
}

#[test]
fn cli_wave_rejects_oversized_duration() {
    let output = thump_bin()
        .args(["wave", "--duration", "1e15"])
        .output()
        .expect("failed to run thump");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("waveform too long"), "got: {stderr}");
}

// ---------------------------------------------------------------------------
// `thump trigger`
// ---------------------------------------------------------------------------

#[test]
fn cli_trigger_json_reports_four_events() {
    let stdout = run_ok(&[
        "trigger",
        "--attack",
        "0.1",
        "--decay",
        "0.2",
        "--sustain",
        "0.5",
        "--release",
        "0.3",
        "--duration",
        "1",
        "--points",
        "5",
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");

    let kinds: Vec<&str> = json["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["set", "linear", "exponential", "set"]);
    assert_eq!(json["events"][2]["value"], 0.5);
    assert!((json["events"][3]["time"].as_f64().unwrap() - 1.3).abs() < 1e-9);
    assert_eq!(json["curve"].as_array().unwrap().len(), 5);
    assert_eq!(json["envelope"]["sustain"], 0.5);
    assert_eq!(json["sources"][0]["name"], "osc");
    assert_eq!(json["sources"][0]["state"], "stopped");
}

#[test]
fn cli_trigger_table() {
    let stdout = run_ok(&["trigger", "--shape", "square", "--cutoff", "800"]);
    assert!(stdout.contains("Gain automation:"), "got:\n{stdout}");
    assert!(stdout.contains("exponential"), "got:\n{stdout}");
    assert!(stdout.contains("osc"), "got:\n{stdout}");
    assert!(stdout.contains("stopped"), "got:\n{stdout}");
}

#[test]
fn cli_trigger_reads_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("thump.toml");
    std::fs::write(&path, "gain = 0.5\n[envelope]\nrelease = 0.05\n").unwrap();

    let stdout = run_ok(&[
        "--config",
        path.to_str().unwrap(),
        "trigger",
        "--duration",
        "0.5",
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["gain"], 0.5);
    assert_eq!(json["events"][1]["value"], 0.5);
    assert!((json["events"][3]["time"].as_f64().unwrap() - 0.55).abs() < 1e-9);
}

#[test]
fn cli_invalid_config_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[envelope]\nsustain = 4.0\n").unwrap();

    let output = thump_bin()
        .args(["--config", path.to_str().unwrap(), "trigger"])
        .output()
        .expect("failed to run thump");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("envelope.sustain"), "got: {stderr}");
}

// ---------------------------------------------------------------------------
// `thump graph`
// ---------------------------------------------------------------------------

#[test]
fn cli_graph_shows_fixed_chain() {
    let stdout = run_ok(&["graph", "--cutoff", "1200"]);
    assert!(stdout.contains("Nodes (5):"), "got:\n{stdout}");
    assert!(stdout.contains("gain → analyser (input)"), "got:\n{stdout}");
    assert!(stdout.contains("analyser → destination (input)"), "got:\n{stdout}");
    assert!(stdout.contains("osc → filter (input)"), "got:\n{stdout}");
    assert!(stdout.contains("filter → gain (input)"), "got:\n{stdout}");
    assert!(stdout.contains("frequency, detune, Q, gain"), "got:\n{stdout}");
    assert!(stdout.contains("armed"), "got:\n{stdout}");
}
