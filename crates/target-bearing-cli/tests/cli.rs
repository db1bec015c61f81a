use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;

const RED_CONFIG: &str = r#"{ "color_range": { "lower": [0, 100, 100], "upper": [20, 255, 255] } }"#;

fn write_frame(path: &Path, patch: Option<(u32, u32, u32, u32)>) {
    let mut img = RgbaImage::from_pixel(320, 320, Rgba([0, 0, 0, 255]));
    if let Some((x0, y0, w, h)) = patch {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }
    }
    img.save(path).unwrap();
}

fn bin() -> Command {
    Command::cargo_bin("target-bearing").unwrap()
}

#[test]
fn detect_reports_angle_and_writes_display_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.png");
    let config = dir.path().join("params.json");
    let output = dir.path().join("out.png");
    write_frame(&input, Some((240, 100, 40, 20)));
    fs::write(&config, RED_CONFIG).unwrap();

    let assert = bin()
        .args(["--log-level", "warn", "detect", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"angle_deg\""));

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let angle = report["target"]["angle_deg"].as_f64().unwrap();
    assert!(angle > 0.0);
    assert_eq!(report["candidates"].as_array().unwrap().len(), 1);

    let written = image::open(&output).unwrap();
    assert_eq!((written.width(), written.height()), (960, 960));
}

#[test]
fn detect_without_target_prints_null() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.png");
    let config = dir.path().join("params.json");
    write_frame(&input, None);
    fs::write(&config, RED_CONFIG).unwrap();

    bin()
        .args(["--log-level", "off", "detect", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"target\": null"));
}

#[test]
fn default_config_round_trips_through_detect() {
    let out = bin().arg("default-config").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("working_size"));
    assert!(stdout.contains("color_range"));

    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("defaults.json");
    let input = dir.path().join("frame.png");
    fs::write(&config, stdout).unwrap();
    write_frame(&input, None);

    bin()
        .args(["detect", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn replay_prints_one_line_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    let out_dir = dir.path().join("out");
    fs::create_dir(&frames).unwrap();
    write_frame(&frames.join("000.png"), Some((140, 150, 40, 20)));
    write_frame(&frames.join("001.png"), None);
    let config = dir.path().join("params.json");
    fs::write(&config, RED_CONFIG).unwrap();

    let assert = bin()
        .args(["--log-level", "error", "replay", "--dir"])
        .arg(&frames)
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["frame"], "000.png");
    assert!(lines[0]["report"]["target"].is_object());
    assert!(lines[1]["report"]["target"].is_null());

    assert!(out_dir.join("000.png").is_file());
    assert!(out_dir.join("001.png").is_file());
}

#[test]
fn replay_of_empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .args(["replay", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PNG or JPEG frames"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.png");
    let config = dir.path().join("bad.json");
    write_frame(&input, None);
    fs::write(&config, r#"{ "color_range": { "lower": [30, 0, 0], "upper": [20, 255, 255] } }"#)
        .unwrap();

    bin()
        .args(["detect", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.json"));
}

#[cfg(feature = "tracing")]
#[test]
fn json_trace_keeps_report_on_stdout_and_spans_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.png");
    let config = dir.path().join("params.json");
    write_frame(&input, Some((140, 150, 40, 20)));
    fs::write(&config, RED_CONFIG).unwrap();

    let assert = bin()
        .env_remove("RUST_LOG")
        .args(["--log-level", "debug", "--json-trace", "detect", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let output = assert.get_output();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["target"].is_object());

    let stderr = String::from_utf8(output.stderr.clone()).unwrap();
    let closed_frame_span = stderr.lines().any(|line| {
        let Ok(event) = serde_json::from_str::<serde_json::Value>(line) else {
            return false;
        };
        event["span"]["name"] == "process" && event["span"]["frame"] == 0
    });
    assert!(closed_frame_span, "stderr:\n{stderr}");
}
