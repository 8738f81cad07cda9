use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, recognizer: &str) -> PathBuf {
    let toml = format!(
        r#"
{recognizer}

[sampling]
rate_hz = 200
sensor_timeout_ms = 20
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Field whose azimuth flips sign every 30 samples, with a z spike 20
/// samples into each block, after the flip has settled.
fn write_samples(dir: &tempfile::TempDir) -> PathBuf {
    let mut csv = String::from("x,y,z\n");
    for block in 0..4 {
        let y = if block % 2 == 0 { 10.0 } else { -10.0 };
        for i in 0..30 {
            let z = if i == 20 { 80.0 } else { 0.0 };
            csv.push_str(&format!("10,{y},{z}\n"));
        }
    }
    let path = dir.path().join("samples.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn stdout_json_lines(out: &std::process::Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON: {l}: {e}")))
        .collect()
}

#[rstest]
#[case(
    "[recognizer]\nkind = \"virtual_tap\"\n\n[[script]]\nat = 0\ncommand = \"init\"",
    "tap",
    1
)]
#[case(
    "[recognizer]\nkind = \"rapid_changes\"\nlow_threshold = 2.0\nhigh_threshold = 20.0",
    "rapid_change",
    0
)]
#[case("[recognizer]\nkind = \"radial_position\"", "radial", 0)]
fn replay_json_lines_follow_schema(
    #[case] recognizer: &str,
    #[case] event: &str,
    #[case] applied: u64,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, recognizer);
    let samples = write_samples(&dir);

    let out = Command::cargo_bin("magneto")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("replay")
        .arg("--input")
        .arg(&samples)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let lines = stdout_json_lines(&out);
    let (summary, observations) = lines.split_last().expect("at least a summary line");

    assert!(!observations.is_empty(), "expected {event} events");
    let mut last_index = None;
    for v in observations {
        assert_eq!(v["event"], event);
        let idx = v["index"].as_u64().expect("index is an integer");
        assert!(last_index.is_none_or(|prev| idx > prev));
        last_index = Some(idx);
        let lp = v["low_pass"].as_array().expect("low_pass array");
        assert_eq!(lp.len(), 3);
        assert!(v["ready"].is_boolean());
    }

    let s = &summary["summary"];
    assert_eq!(s["samples"], 120);
    assert_eq!(s["stop"], "end_of_stream");
    assert_eq!(s["commands_applied"], applied);
    assert!(s["recognizer"].is_string());
}

#[test]
fn rapid_changes_counts_each_spike_once() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        "[recognizer]\nkind = \"rapid_changes\"\nlow_threshold = 2.0\nhigh_threshold = 20.0",
    );
    let samples = write_samples(&dir);

    let out = Command::cargo_bin("magneto")
        .unwrap()
        .args(["--json", "--config"])
        .arg(&cfg)
        .arg("replay")
        .arg("--input")
        .arg(&samples)
        .output()
        .unwrap();
    assert!(out.status.success());

    let lines = stdout_json_lines(&out);
    let counts: Vec<u64> = lines
        .iter()
        .filter(|v| v["event"] == "rapid_change")
        .map(|v| v["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
    assert_eq!(lines.last().unwrap()["summary"]["detections"], 4);
}

#[test]
fn error_is_a_single_json_object_on_stdout() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        "[recognizer]\nkind = \"linear_motion\"\n\n[[script]]\nat = 1\ncommand = \"init\"",
    );
    let samples = write_samples(&dir);

    let out = Command::cargo_bin("magneto")
        .unwrap()
        .args(["--json", "--config"])
        .arg(&cfg)
        .arg("replay")
        .arg("--input")
        .arg(&samples)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));

    let lines = stdout_json_lines(&out);
    let err = lines.last().unwrap();
    assert_eq!(err["reason"], "UnsupportedCommand");
    assert!(err["message"].as_str().unwrap().contains("`init`"));
}

#[test]
fn self_check_json() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[recognizer]\nkind = \"position\"\nslots = 2\nthreshold = 2.0");

    let out = Command::cargo_bin("magneto")
        .unwrap()
        .args(["--json", "--config"])
        .arg(&cfg)
        .arg("self-check")
        .output()
        .unwrap();
    assert!(out.status.success());
    let lines = stdout_json_lines(&out);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "ok");
    assert_eq!(lines[0]["recognizer"], "position");
}
