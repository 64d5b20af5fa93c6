//! End-to-end tests for the `offsets` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's config dir and environment.
fn offsets(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("offsets").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("OFFSETS_WEEKMASK")
        .env_remove("OFFSETS_HOLIDAYS")
        .env_remove("OFFSETS_DEFAULT_FREQ")
        .env_remove("OFFSETS_BUSINESS_HOURS_START")
        .env_remove("OFFSETS_BUSINESS_HOURS_END")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_apply_default_business_day() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .args(["apply", "2020-01-03 09:00"])
        .assert()
        .success()
        .stdout("2020-01-06 09:00:00\n");
}

#[test]
fn test_apply_with_freq_and_json() {
    let home = TempDir::new().unwrap();
    let out = offsets(&home)
        .args(["--json", "apply", "2024-01-31", "--freq", "M"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["result"], "2024-02-29 00:00:00");
    assert_eq!(value["offset"], "M");
}

#[test]
fn test_holidays_from_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(&config, "holidays = [\"2024-12-25\", \"2024-12-26\"]\n").unwrap();

    offsets(&home)
        .args(["--config"])
        .arg(&config)
        .args(["apply", "2024-12-24", "--freq", "C"])
        .assert()
        .success()
        .stdout("2024-12-27 00:00:00\n");
}

#[test]
fn test_environment_overrides_default_freq() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .env("OFFSETS_DEFAULT_FREQ", "MS")
        .args(["roll", "2024-05-15"])
        .assert()
        .success()
        .stdout("2024-06-01 00:00:00\n");
}

#[test]
fn test_roll_back() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .args(["roll", "2024-05-15", "--freq", "W-MON", "--direction", "back"])
        .assert()
        .success()
        .stdout("2024-05-13 00:00:00\n");
}

#[test]
fn test_range_with_periods() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .args(["range", "--start", "2024-01-01", "--periods", "4", "--freq", "QS"])
        .assert()
        .success()
        .stdout(
            "2024-01-01 00:00:00\n2024-04-01 00:00:00\n2024-07-01 00:00:00\n2024-10-01 00:00:00\n",
        );
}

#[test]
fn test_range_json() {
    let home = TempDir::new().unwrap();
    let out = offsets(&home)
        .args(["--json", "range", "--start", "2020-01-01", "--end", "2020-01-07"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let dates: Vec<String> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(dates.len(), 5);
    assert_eq!(dates[2], "2020-01-03 00:00:00");
}

#[test]
fn test_describe() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .args(["describe", "--freq", "WOM-3FRI"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule code: WOM-3FRI"));
}

#[test]
fn test_unknown_freq_fails() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .args(["apply", "2024-01-01", "--freq", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid frequency 'NOPE'"));
}

#[test]
fn test_bad_timestamp_fails() {
    let home = TempDir::new().unwrap();
    offsets(&home)
        .args(["apply", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid timestamp"));
}
