//! Integration tests for the gymlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Password setup, login and the session gate
//! - Workout logging and validation failures
//! - Routines, history, progress and stats views
//! - CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PASSWORD: &str = "squat-every-day";

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI bound to `dir`, isolated from the user's config and environment
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gymlog").expect("Failed to find gymlog binary");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("GYMLOG_PASSWORD")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

/// Set a password, which also starts a session
fn setup_logged_in() -> TempDir {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["setup", "--password", PASSWORD])
        .assert()
        .success()
        .stdout(predicate::str::contains("logged in"));
    temp_dir
}

fn stored_data(dir: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(dir.join("data/gymTrackerData")).expect("Failed to read data");
    serde_json::from_str(&raw).expect("Stored data is not JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Personal workout log"));
}

#[test]
fn test_commands_blocked_without_password() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("gymlog setup"));
}

#[test]
fn test_setup_rejects_short_password() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["setup", "--password", "short"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least 8 characters"));

    assert!(!temp_dir.path().join("data/gymTrackerPasswordHash").exists());
}

#[test]
fn test_setup_twice_requires_force() {
    let temp_dir = setup_logged_in();
    cli(temp_dir.path())
        .args(["setup", "--password", "another-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already set"));

    cli(temp_dir.path())
        .args(["setup", "--password", "another-password", "--force"])
        .assert()
        .success();
}

#[test]
fn test_logout_and_login() {
    let temp_dir = setup_logged_in();

    cli(temp_dir.path()).arg("logout").assert().success();
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));

    cli(temp_dir.path())
        .args(["login", "--password", "wrong-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect password"));

    cli(temp_dir.path())
        .arg("login")
        .env("GYMLOG_PASSWORD", PASSWORD)
        .assert()
        .success();
    cli(temp_dir.path()).arg("stats").assert().success();
}

#[test]
fn test_password_stored_as_digest() {
    let temp_dir = setup_logged_in();
    let hash = fs::read_to_string(temp_dir.path().join("data/gymTrackerPasswordHash")).unwrap();
    assert_eq!(hash.len(), 64);
    assert!(!hash.contains(PASSWORD));
}

#[test]
fn test_log_workout_persists_valid_sets_only() {
    let temp_dir = setup_logged_in();

    cli(temp_dir.path())
        .args([
            "log",
            "-e",
            "Bench Press=8x135,0x135,abcx100,5",
            "-e",
            "Curl=x30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 1 exercises"));

    let data = stored_data(temp_dir.path());
    let workouts = data["workouts"].as_array().unwrap();
    assert_eq!(workouts.len(), 1);

    let exercises = workouts[0]["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0]["name"], "Bench Press");

    let sets = exercises[0]["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0]["reps"], 8);
    assert_eq!(sets[0]["weight"], 135.0);
    assert_eq!(sets[1]["reps"], 5);
    assert_eq!(sets[1]["weight"], 0.0);
}

#[test]
fn test_log_validation_errors_leave_data_unchanged() {
    let temp_dir = setup_logged_in();
    cli(temp_dir.path())
        .args(["log", "-e", "Squat=5x225"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("log")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least one exercise"));

    cli(temp_dir.path())
        .args(["log", "-e", "Squat=5x225", "-e", "  =5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exercise names"));

    cli(temp_dir.path())
        .args(["log", "-e", "Squat=0x225"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive rep count"));

    let data = stored_data(temp_dir.path());
    assert_eq!(data["workouts"].as_array().unwrap().len(), 1);
}

#[test]
fn test_routine_lifecycle_and_log_from_routine() {
    let temp_dir = setup_logged_in();

    cli(temp_dir.path())
        .args(["routine", "save", "Leg Day", "Squat:4x8@135", "Lunges"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved with 2 exercises"));

    cli(temp_dir.path())
        .args(["routine", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Leg Day"))
        .stdout(predicate::str::contains("Squat: 4 sets x 8 reps @ 135"));

    let data = stored_data(temp_dir.path());
    assert_eq!(data["routines"]["Leg Day"][1], "Lunges");
    assert_eq!(data["routines"]["Leg Day"][0]["sets"], 4);

    // The legacy entry expands to one blank set and is dropped on save
    cli(temp_dir.path())
        .args(["log", "--routine", "Leg Day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 1 exercises (4 sets)"));

    // Sets given for a routine exercise fill its card instead of adding one
    cli(temp_dir.path())
        .args(["log", "--routine", "Leg Day", "-e", "lunges=12,10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 2 exercises (6 sets)"));
    let data = stored_data(temp_dir.path());
    let last = &data["workouts"][1]["exercises"];
    assert_eq!(last[1]["name"], "Lunges");
    assert_eq!(last[1]["sets"].as_array().unwrap().len(), 2);

    cli(temp_dir.path())
        .args(["log", "--routine", "Arm Day"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No routine named"));

    cli(temp_dir.path())
        .args(["routine", "delete", "Leg Day"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["routine", "delete", "Leg Day"])
        .assert()
        .failure();

    let data = stored_data(temp_dir.path());
    assert!(data["routines"].as_object().unwrap().is_empty());
}

#[test]
fn test_routine_validation() {
    let temp_dir = setup_logged_in();
    cli(temp_dir.path())
        .args(["routine", "save", "  ", "Squat"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("routine name"));

    cli(temp_dir.path())
        .args(["routine", "save", "Empty", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one exercise"));
}

#[test]
fn test_progress_and_stats() {
    let temp_dir = setup_logged_in();
    for spec in ["Bench Press=8x135", "Bench Press=8x140,6x145", "Squat=5x225"] {
        cli(temp_dir.path()).args(["log", "-e", spec]).assert().success();
    }

    cli(temp_dir.path())
        .args(["progress", "bench press"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress for: bench press"))
        .stdout(predicate::str::contains("Set 2: 6 reps @ 145 lbs"))
        .stdout(predicate::str::contains("(14 reps, top 145 lbs)"));

    cli(temp_dir.path())
        .args(["progress", "Deadlift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No history found"));

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Workouts: 3"))
        .stdout(predicate::str::contains("Total Sets Completed: 4"))
        .stdout(predicate::str::contains("Bench Press: 2 times"));
}

#[test]
fn test_history_limit() {
    let temp_dir = setup_logged_in();
    for spec in ["Row=10", "Dips=12", "Plank=1"] {
        cli(temp_dir.path()).args(["log", "-e", spec]).assert().success();
    }

    let output = cli(temp_dir.path())
        .args(["history", "--limit", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("📅").count(), 2);

    cli(temp_dir.path())
        .args(["history", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Row"))
        .stdout(predicate::str::contains("bodyweight"));
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_logged_in();
    cli(temp_dir.path())
        .args(["log", "-e", "Bench Press=8x135,6x145;paused"])
        .assert()
        .success();

    let output = temp_dir.path().join("out/log.csv");
    cli(temp_dir.path())
        .arg("export")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sets"));

    let contents = fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("date,exercise,set,reps,weight,notes"));
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn test_config_file_overrides_display() {
    let temp_dir = setup_logged_in();
    let config_dir = temp_dir.path().join("config/gymlog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[display]\nweight_unit = \"kg\"\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .args(["log", "-e", "Squat=5x100"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["progress", "squat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 reps @ 100 kg"));
}
