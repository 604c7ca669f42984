use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Deserialize)]
struct CanonicalStride {
    source: Source,
    time_s: Vec<f64>,
    legs: Vec<LegCurve>,
}

#[derive(Deserialize)]
struct Source {
    span: usize,
    cadence_spm: f64,
}

#[derive(Deserialize)]
struct LegCurve {
    leg: String,
    degrees: Vec<f64>,
}

fn data_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("test_data")
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[test]
fn stride_command_emits_hundred_point_curves() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args([
        "stride",
        "--input",
        &data_path("synthetic_2hz_30fps.run"),
        "--config",
        &data_path("synthetic_30fps.toml"),
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let stride: CanonicalStride = serde_json::from_slice(&out)?;
    assert_eq!(stride.source.span, 15);
    assert!(stride.source.cadence_spm > 120.0 && stride.source.cadence_spm < 140.0);
    assert_eq!(stride.time_s.len(), 100);
    assert!((stride.time_s[99] - 0.5).abs() < 1e-9);
    let names: Vec<&str> = stride.legs.iter().map(|l| l.leg.as_str()).collect();
    assert_eq!(names, ["Left", "Right"]);
    assert!(stride.legs.iter().all(|l| l.degrees.len() == 100));
    Ok(())
}

#[test]
fn stride_command_reads_stdin() -> Result<(), Box<dyn Error>> {
    let input = std::fs::read_to_string(data_path("synthetic_2hz_30fps.run"))?;
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args(["stride", "--source-fs", "30", "--fs", "30"])
        .write_stdin(input);
    let out = cmd.assert().success().get_output().stdout.clone();
    let stride: CanonicalStride = serde_json::from_slice(&out)?;
    assert_eq!(stride.time_s.len(), 100);
    Ok(())
}
