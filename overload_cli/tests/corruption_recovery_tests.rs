//! Corruption recovery tests for the overload binary.
//!
//! These tests verify the system can handle:
//! - Corrupted rotation files
//! - Corrupted WAL and CSV files
//! - Partial writes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("overload"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn setup_rotation(data_dir: &Path) {
    cli(data_dir).arg("init").assert().success();
    cli(data_dir).args(["day", "add", "Legs"]).assert().success();
    cli(data_dir)
        .args(["exercise", "add", "1", "Squat"])
        .args(["--weight", "185", "--reps", "8", "--sets", "3"])
        .assert()
        .success();
}

#[test]
fn test_corrupted_rotation_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("rotation.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted rotation");

    // Treated as missing rather than crashing
    cli(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rotation found"));

    cli(data_dir).arg("complete").assert().failure();

    // A fresh rotation can replace the corrupted one
    cli(data_dir).arg("init").assert().success();
    cli(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("My Rotation"));
}

#[test]
fn test_corrupted_wal_lines_skipped_in_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    setup_rotation(data_dir);

    cli(data_dir).arg("complete").assert().success();

    let wal_path = data_dir.join("wal/workout_logs.wal");
    let mut file = fs::OpenOptions::new().append(true).open(&wal_path).unwrap();
    writeln!(file, "{{ not a workout log").unwrap();
    drop(file);

    cli(data_dir).arg("complete").assert().success();

    cli(data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Squat: 185 lb, 9 reps, 3 sets"));

    cli(data_dir)
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 2 workout logs"));
}

#[test]
fn test_partial_wal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    setup_rotation(data_dir);

    cli(data_dir).arg("complete").assert().success();

    // Simulate a crash in the middle of an append
    let wal_path = data_dir.join("wal/workout_logs.wal");
    let mut file = fs::OpenOptions::new().append(true).open(&wal_path).unwrap();
    write!(file, r#"{{"id":"00000000-0000-0000-0000-000000000000","session_id""#).unwrap();
    drop(file);

    cli(data_dir)
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1 workout logs"));
}

#[test]
fn test_corrupted_csv_rows_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    setup_rotation(data_dir);

    cli(data_dir).arg("complete").assert().success();
    cli(data_dir).arg("rollup").assert().success();

    let csv_path = data_dir.join("workout_logs.csv");
    let mut file = fs::OpenOptions::new().append(true).open(&csv_path).unwrap();
    writeln!(file, "garbage,row,with,too,few,fields").unwrap();
    drop(file);

    cli(data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Legs"));
}

#[test]
fn test_missing_data_dir_created_on_init() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("nested/overload");

    cli(&data_dir).arg("init").assert().success();
    assert!(data_dir.join("rotation.json").exists());
}
