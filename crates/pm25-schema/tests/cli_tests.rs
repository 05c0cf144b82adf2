//! Command-line tests for the `pm25-schema` binary.
//!
//! These run the compiled binary in a temporary directory and check exit
//! codes and the log file it writes.

use chrono::DateTime;
use pm25_schema::{DataKind, SignConstraint, pm25_feature_schema};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

// ============================================================================
// Helper Functions
// ============================================================================

/// CSV text that satisfies every rule of the PM2.5 schema.
fn conforming_csv() -> String {
    let mut header = Vec::new();
    let mut rows = vec![Vec::new(), Vec::new(), Vec::new()];

    for spec in pm25_feature_schema().columns() {
        if spec.name == "pm25_boxcox" {
            continue;
        }
        let rule = &spec.rule;
        let values: [String; 3] = match (rule.kind, rule.min, rule.max) {
            (DataKind::Int, Some(min), Some(max)) => [
                (min as i64).to_string(),
                (max as i64).to_string(),
                (min as i64).to_string(),
            ],
            (DataKind::Float, Some(_), Some(_)) => {
                ["-1.0".into(), "0.0".into(), "1.0".into()]
            }
            _ if rule.sign == SignConstraint::Positive => {
                ["12.5".into(), "30.0".into(), "0.0".into()]
            }
            _ => ["-3.5".into(), "0.0".into(), "4.25".into()],
        };
        header.push(spec.name.clone());
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    let mut csv = header.join(",");
    for row in rows {
        csv.push('\n');
        csv.push_str(&row.join(","));
    }
    csv.push('\n');
    csv
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pm25-schema"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to run pm25-schema")
}

fn check_args<'a>(input: &'a str, log_file: &'a str) -> Vec<&'a str> {
    vec![
        "--log-file",
        log_file,
        "check",
        "--input",
        input,
        "--schema-out",
        "schema.json",
        "--metadata-db",
        "mlmd_metadata.db",
    ]
}

// ============================================================================
// Exit Codes
// ============================================================================

#[test]
fn test_conforming_dataset_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("train.csv"), conforming_csv()).unwrap();

    let output = run(dir.path(), &check_args("train.csv", "check.log"));

    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("schema.json").exists());
    assert!(dir.path().join("mlmd_metadata.db").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SCHEMA CHECK PASSED"));
}

#[test]
fn test_missing_required_column_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("train.csv"), "pm25,pm25_log\n10.0,2.3\n").unwrap();

    let output = run(dir.path(), &check_args("train.csv", "check.log"));

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SCHEMA CHECK FAILED"));
}

#[test]
fn test_missing_input_file_exits_one() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &check_args("nope.csv", "check.log"));

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("schema.json").exists());
}

#[test]
fn test_unusable_log_file_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file standing where the log directory should be
    fs::write(dir.path().join("blocker"), "").unwrap();

    let output = run(dir.path(), &["--log-file", "blocker/check.log", "schema"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to open log file"), "stderr: {stderr}");
}

#[test]
fn test_evaluate_requires_transform() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("preds.csv"), "pm25,yhat\n9.0,4.0\n").unwrap();

    let output = run(
        dir.path(),
        &["--no-log-file", "evaluate", "--predictions", "preds.csv"],
    );

    // clap usage errors
    assert_eq!(output.status.code(), Some(2));

    let output = run(
        dir.path(),
        &[
            "--no-log-file",
            "evaluate",
            "--predictions",
            "preds.csv",
            "--lambda",
            "0.5",
        ],
    );
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RMSE"), "stdout: {stdout}");
}

// ============================================================================
// Log File
// ============================================================================

#[test]
fn test_log_file_is_timestamped_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("train.csv"), "pm25,pm25_log\n10.0,2.3\n").unwrap();

    let output = run(dir.path(), &check_args("train.csv", "logs/check.log"));
    assert_eq!(output.status.code(), Some(2));

    let log = fs::read_to_string(dir.path().join("logs/check.log")).unwrap();
    assert!(!log.contains('\u{1b}'), "log file must not contain ANSI escapes");

    let error_lines: Vec<_> = log.lines().filter(|l| l.contains(" ERROR ")).collect();
    assert_eq!(error_lines.len(), 24);
    assert!(error_lines.iter().any(|l| l.contains("'lag_1'")));
    assert!(error_lines.iter().any(|l| l.contains("'cos_day_of_week'")));

    for line in &error_lines {
        let timestamp = line.split_whitespace().next().unwrap();
        assert!(
            DateTime::parse_from_rfc3339(timestamp).is_ok(),
            "not a timestamp: {timestamp}"
        );
    }
}

#[test]
fn test_log_file_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("train.csv"), "pm25,pm25_log\n10.0,2.3\n").unwrap();
    let log_path = dir.path().join("check.log");

    run(dir.path(), &check_args("train.csv", "check.log"));
    let first = fs::read_to_string(&log_path).unwrap();
    assert!(!first.is_empty());

    run(dir.path(), &check_args("train.csv", "check.log"));
    let second = fs::read_to_string(&log_path).unwrap();

    assert!(second.starts_with(&first));
    assert_eq!(
        second.matches("Data validation failed.").count(),
        2 * first.matches("Data validation failed.").count()
    );
}
