use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::{error::Error, path::PathBuf};

#[derive(Deserialize)]
struct Summary {
    fs: f64,
    sample_count: usize,
    crossings: usize,
    events: usize,
    median_cadence_spm: Option<f64>,
    stride: Option<serde_json::Value>,
    stride_error: Option<serde_json::Value>,
    report: Report,
}

#[derive(Deserialize)]
struct Report {
    raw_frames: usize,
    malformed: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Detection {
    crossings: Vec<usize>,
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct Event {
    cadence_spm: f64,
    span: usize,
}

#[test]
fn flat_recording_reports_missing_stride() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args(["analyze", "--input", &sample_path("test_data/flat.run")]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let summary: Summary = serde_json::from_slice(&out)?;
    assert_eq!(summary.fs, 30.0);
    // 3 rows at 15 Hz -> 5 samples at 30 Hz
    assert_eq!(summary.sample_count, 5);
    assert_eq!(summary.crossings, 0);
    assert_eq!(summary.events, 0);
    assert!(summary.median_cadence_spm.is_none());
    assert!(summary.stride.is_none());
    let err = summary.stride_error.expect("stride error");
    assert!(err.get("NoValidStride").is_some(), "unexpected error {err}");
    Ok(())
}

#[test]
fn stride_command_fails_without_gait_events() {
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args([
        "stride",
        "--input",
        &sample_path("test_data/flat.run"),
        "--source-fs",
        "30",
    ]);
    let assert = cmd.assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("need at least two gait events"),
        "stderr: {stderr}"
    );
}

#[test]
fn synthetic_run_cadence_converges() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args([
        "cadence",
        "--input",
        &sample_path("test_data/synthetic_2hz_30fps.run"),
        "--config",
        &sample_path("test_data/synthetic_30fps.toml"),
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let detection: Detection = serde_json::from_slice(&out)?;
    assert!((19..=21).contains(&detection.crossings.len()));
    assert!(detection.events.iter().all(|e| e.span == 15));
    let last = detection.events.last().expect("events");
    assert!((last.cadence_spm - 120.0).abs() / 120.0 < 0.06);
    Ok(())
}

#[test]
fn synthetic_run_summary_counts_skipped_rows() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args([
        "analyze",
        "--input",
        &sample_path("test_data/synthetic_2hz_30fps.run"),
        "--source-fs",
        "30",
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let summary: Summary = serde_json::from_slice(&out)?;
    assert_eq!(summary.report.raw_frames, 300);
    assert_eq!(summary.report.malformed.len(), 1);
    assert_eq!(summary.sample_count, 300);
    assert!(summary.stride.is_some());
    assert!(summary.stride_error.is_none());
    Ok(())
}

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .expect("crates dir")
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

fn sample_path(relative: &str) -> String {
    workspace_root()
        .join(relative)
        .to_string_lossy()
        .to_string()
}
