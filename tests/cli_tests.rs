mod common;

use common::{hadron, two_body};
use hftrigger::consts::{MASS_D0, MASS_KAON, MASS_PION};
use hftrigger::track::{Event, TwoProng};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    events_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let events_path = dir.path().join("events.json");

        // Event 0 carries a high-pT D0, event 1 a soft one
        let events: Vec<Event> = [0.98, 0.5]
            .iter()
            .enumerate()
            .map(|(id, &beta)| {
                let [pi, k] = two_body(MASS_D0, MASS_PION, MASS_KAON, beta);
                Event {
                    id: id as u64,
                    tracks: vec![hadron(pi, 1), hadron(k, -1)],
                    two_prongs: vec![TwoProng {
                        pos: 0,
                        neg: 1,
                        features: None,
                    }],
                    ..Default::default()
                }
            })
            .collect();
        fs::write(&events_path, serde_json::to_string(&events).unwrap()).unwrap();

        Self { dir, events_path }
    }
}

fn hftrigger(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hftrigger"))
        .args(args)
        .output()
        .expect("Failed to execute binary")
}

#[test]
fn test_cli_run_writes_decisions() {
    let ctx = TestContext::new();
    let out_path = ctx.dir.path().join("decisions.csv");

    let output = hftrigger(&[
        "run",
        "--events",
        ctx.events_path.to_str().unwrap(),
        "--output",
        out_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("HighPt2P"));

    let mut reader = csv::Reader::from_path(&out_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "0");
    assert_ne!(&rows[0][1], "0");
    assert_eq!(&rows[1][1], "0");
}

#[test]
fn test_cli_config_file_with_override() {
    let ctx = TestContext::new();
    let config_path = ctx.dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{ "general": { "qa_level": 1, "pt_threshold_2prong": 5.0 } }"#,
    )
    .unwrap();

    let output = hftrigger(&[
        "config",
        "--config-file",
        config_path.to_str().unwrap(),
        "--qa-level",
        "2",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout.find('{').unwrap();
    let printed: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();
    assert_eq!(printed["general"]["qa_level"], 2);
    assert_eq!(printed["general"]["pt_threshold_2prong"], 5.0);
}

#[test]
fn test_cli_rejects_bad_config() {
    let output = hftrigger(&["config", "--delta-mass-charm", "0.08,0.08"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("delta_mass_charm"));
}

#[test]
fn test_cli_missing_events_file() {
    let output = hftrigger(&["run", "--events", "/nonexistent/events.json"]);
    assert_eq!(output.status.code(), Some(1));
}
