// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "kbest-cli-{}-{nanos}-{name}",
        std::process::id()
    ));
    fs::write(&path, contents).expect("temp file should be writable");
    path
}

fn kbest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kbest"))
        .args(args)
        .output()
        .expect("kbest binary should run")
}

fn path_arg(path: &PathBuf) -> &str {
    path.to_str().expect("temp path should be UTF-8")
}

#[test]
fn select_writes_mask_and_diagnostics() {
    let input = temp_file(
        "dips.txt",
        "0.70 2.66 2.49 0.23 0.14 0.72 -1.22 0.36 1.44 -0.69 0.41 1.44 2.10",
    );
    let output = kbest(&["select", "--input", path_arg(&input), "--k", "3"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["command"], "select");
    assert_eq!(json["input"]["n"], 13);
    assert_eq!(json["run_count"], 3);
    assert_eq!(
        json["mask"],
        serde_json::json!([1, 1, 1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 1])
    );
    assert_eq!(json["diagnostics"]["algorithm"], "kbest");
    fs::remove_file(input).expect("cleanup");
}

#[test]
fn zero_block_costs_no_run_and_logs_to_stderr() {
    let input = temp_file("zeros.json", "[0, -1, 5]");
    let output = Command::new(env!("CARGO_BIN_EXE_kbest"))
        .args(["select", "--input", path_arg(&input), "--k", "2"])
        .env("KBEST_LOG", "debug")
        .output()
        .expect("kbest binary should run");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["mask"], serde_json::json!([0, 0, 1]));
    assert_eq!(json["run_count"], 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("starting kbest sweep"), "stderr: {stderr}");
    fs::remove_file(input).expect("cleanup");
}

#[test]
fn select_writes_to_output_file() {
    let input = temp_file("w.json", "[5, -1, 3, -3, 1]");
    let out = std::env::temp_dir().join(format!("kbest-cli-out-{}.json", std::process::id()));
    let output = kbest(&[
        "select",
        "--input",
        path_arg(&input),
        "--k",
        "3",
        "--reconstruction",
        "checkpointed",
        "--output",
        path_arg(&out),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("output file should exist"))
            .expect("output should be JSON");
    assert_eq!(written["mask"], serde_json::json!([1, 0, 1, 0, 1]));
    assert_eq!(written["diagnostics"]["reconstruction"], "checkpointed");
    fs::remove_file(input).expect("cleanup");
    fs::remove_file(out).expect("cleanup");
}

#[test]
fn negative_budget_reports_structured_error() {
    let output = kbest(&["select", "--input", "does-not-exist.csv", "--k", "-1"]);
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert_eq!(json["error"]["code"], "invalid_budget");
}

#[test]
fn non_finite_input_reports_invalid_input() {
    let input = temp_file("nan.csv", "value\n1.0\nNaN\n");
    let output = kbest(&["select", "--input", path_arg(&input), "--k", "1"]);
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert_eq!(json["error"]["code"], "invalid_input");
    fs::remove_file(input).expect("cleanup");
}

#[test]
fn check_reports_optimality() {
    let input = temp_file("check.csv", "5,-1,3,-3,1\n");
    let good = temp_file("good.txt", "1 1 1 0 0");
    let bad = temp_file("bad.txt", "1 0 0 0 1");

    let output = kbest(&[
        "check",
        "--input",
        path_arg(&input),
        "--mask",
        path_arg(&good),
        "--k",
        "1",
        "--exhaustive",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["optimal"], true);
    assert_eq!(json["optimal_sum"], 7.0);
    assert_eq!(json["exhaustive"]["optimal"], true);
    assert_eq!(json["report"]["run_count"], 1);

    let output = kbest(&[
        "check",
        "--input",
        path_arg(&input),
        "--mask",
        path_arg(&bad),
        "--k",
        "1",
    ]);
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["optimal"], false);
    assert_eq!(json["report"]["within_budget"], false);
    assert!(json["exhaustive"].is_null());

    for path in [input, good, bad] {
        fs::remove_file(path).expect("cleanup");
    }
}

#[test]
fn usage_errors_are_structured() {
    let output = kbest(&["select", "--k", "1"]);
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert_eq!(json["error"]["code"], "usage_error");
}
