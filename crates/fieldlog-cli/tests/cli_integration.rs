//! CLI integration tests.
//!
//! These run the fieldlog binary and verify command behavior that needs no
//! hardware. Tests that talk to a real sensor are marked #[ignore]; run them
//! with:
//!
//! ```
//! FIELDLOG_DEVICE="MyESP32" cargo test --package fieldlog-cli --test cli_integration -- --ignored --nocapture
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Get path to the fieldlog binary.
fn binary_path() -> String {
    let release = concat!(env!("CARGO_MANIFEST_DIR"), "/../../target/release/fieldlog");
    let debug = concat!(env!("CARGO_MANIFEST_DIR"), "/../../target/debug/fieldlog");

    if std::path::Path::new(release).exists() {
        release.to_string()
    } else if std::path::Path::new(debug).exists() {
        debug.to_string()
    } else {
        "cargo".to_string()
    }
}

/// Run fieldlog with the given arguments.
fn run_fieldlog(args: &[&str]) -> Output {
    let binary = binary_path();
    if binary == "cargo" {
        Command::new("cargo")
            .args(["run", "--quiet", "--package", "fieldlog-cli", "--"])
            .args(args)
            .output()
            .expect("failed to run fieldlog via cargo")
    } else {
        Command::new(&binary)
            .args(args)
            .output()
            .expect("failed to run fieldlog binary")
    }
}

/// Write a config file pointing the log into a temp directory.
fn temp_config(dir: &tempfile::TempDir) -> PathBuf {
    let log_path = dir.path().join("readings.csv");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!("log_path = {:?}\n", log_path.to_str().unwrap()),
    )
    .unwrap();
    config_path
}

// ============================================================================
// Help and version (no hardware required)
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let output = run_fieldlog(&["--help"]);
    assert!(output.status.success(), "help should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fieldlog"));
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("take-reading"));
    assert!(stdout.contains("share"));
    assert!(stdout.contains("clear"));
    assert!(stdout.contains("log"));
}

#[test]
fn test_version() {
    let output = run_fieldlog(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fieldlog"));
}

#[test]
fn test_subcommand_help() {
    for cmd in ["scan", "take-reading", "log", "share", "clear"] {
        let output = run_fieldlog(&[cmd, "--help"]);
        assert!(output.status.success(), "{} --help should succeed", cmd);
        assert!(!output.stdout.is_empty());
    }
}

// ============================================================================
// Store-backed commands (no hardware required)
// ============================================================================

#[test]
fn test_log_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    let output = run_fieldlog(&["--config", config.to_str().unwrap(), "log"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Log is empty"));
}

#[test]
fn test_clear_yes_succeeds_on_missing_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    let output = run_fieldlog(&["--config", config.to_str().unwrap(), "clear", "--yes"]);

    assert!(output.status.success());
    // Clearing creates the (empty) file.
    assert!(dir.path().join("readings.csv").exists());
}

#[test]
fn test_clear_without_confirmation_refuses_when_not_a_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    let log_path = dir.path().join("readings.csv");
    fs::write(&log_path, "\"1970-01-01T00:00:00Z\",\"1\",\"2\",\"3\",\"4\"\n").unwrap();

    let output = run_fieldlog(&["--config", config.to_str().unwrap(), "clear"]);

    assert!(!output.status.success());
    // The store must be untouched.
    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("1970-01-01"));
}

#[test]
fn test_share_empty_store_fails_with_storage_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    let output = run_fieldlog(&[
        "--config",
        config.to_str().unwrap(),
        "share",
        "--to",
        dir.path().join("out").to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_share_copies_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    let line = "\"1970-01-01T00:00:00Z\",\"56.9\",\"24.1\",\"25.5\",\"60\"\n";
    fs::write(dir.path().join("readings.csv"), line).unwrap();

    let out_dir = dir.path().join("out");
    let output = run_fieldlog(&[
        "--config",
        config.to_str().unwrap(),
        "share",
        "--to",
        out_dir.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let destination = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim().to_string());
    assert!(destination.starts_with(&out_dir));
    assert_eq!(fs::read_to_string(&destination).unwrap(), line);
}

#[test]
fn test_log_prints_stored_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    fs::write(
        dir.path().join("readings.csv"),
        "\"1970-01-01T00:00:00Z\",\"56.9\",\"24.1\",\"25.5\",\"60\"\n",
    )
    .unwrap();

    let output = run_fieldlog(&["--config", config.to_str().unwrap(), "log"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("25.5"));
    assert!(stdout.contains("1970-01-01"));
}

// ============================================================================
// Hardware tests (require a live sensor)
// ============================================================================

#[test]
#[ignore = "requires BLE hardware"]
fn test_scan_finds_sensor() {
    let output = run_fieldlog(&["scan", "--timeout", "30"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Connected"));
}

#[test]
#[ignore = "requires BLE hardware"]
fn test_take_reading_appends() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_config(&dir);

    let output = run_fieldlog(&[
        "--config",
        config.to_str().unwrap(),
        "take-reading",
        "--timeout",
        "30",
    ]);
    assert!(output.status.success());
    assert!(dir.path().join("readings.csv").exists());
}
