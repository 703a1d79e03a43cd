//! End-to-end tests running the `tabtime` binary.
//!
//! Each test writes a timesheet into a temporary directory and points
//! `HOME`/`XDG_CONFIG_HOME` there so no user configuration leaks in.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const SHEET: &str = "Client X\n\
@rate\t100\n\
@breakout\t[X-1] Migration\n\
2023-08-01\t8:00\t9:30\t[X-1] Schema.\n\
2023-08-01\t10:00\t11:00\tStandup. Email\n";

fn tabtime(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tabtime"))
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("TABTIME_RATE")
        .env_remove("TABTIME_FORMAT")
        .env_remove("TABTIME_DESCRIPTION_LIMIT")
        .env_remove("TABTIME_STRICT")
        .args(args)
        .output()
        .expect("failed to run tabtime")
}

fn write_sheet(temp: &TempDir, contents: &str) -> String {
    let path = temp.path().join("sheet.tsv");
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_report_prints_buckets() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(&temp, SHEET);

    let output = tabtime(temp.path(), &["report", &sheet]);
    assert!(
        output.status.success(),
        "report should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Report\tClient X");
    assert_eq!(lines.len(), 8);
    assert!(lines.contains(&"Sum\t2h30m\t2.50\t250.00\tX-1\tEmail. Schema. Standup."));
    assert!(lines.contains(&"[X-1] Migration\t1h30m\t1.50\t150.00\tX-1\tSchema."));
    assert!(output.stderr.is_empty());
}

#[test]
fn test_report_rate_flag_and_csv() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(&temp, SHEET);

    let output = tabtime(
        temp.path(),
        &["report", &sheet, "--rate", "50", "--format", "csv"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\nSum,2h30m,2.50,125.00,X-1,Email. Schema. Standup.\n"));
}

#[test]
fn test_overlap_is_a_trailing_warning() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(
        &temp,
        "2023-08-01\t08:00\t09:00\n2023-08-01\t09:00\t10:00\n",
    );

    let output = tabtime(temp.path(), &["report", &sheet]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Sum\t2h00m"));
    assert_eq!(
        String::from_utf8(output.stderr).unwrap(),
        "warning: line 1 overlaps line 2, ensure start and stop are not the same\n"
    );

    let output = tabtime(temp.path(), &["report", &sheet, "--strict"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("strict mode"));
}

#[test]
fn test_shifted_start_removes_overlap() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(
        &temp,
        "2023-08-01\t08:00\t09:00\n2023-08-01\t09:01\t10:00\n",
    );

    let output = tabtime(temp.path(), &["check", &sheet, "--strict"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No overlaps."));
    assert!(output.stderr.is_empty());
}

#[test]
fn test_fatal_parse_error_names_line() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(&temp, "Title\n2023-08-01\t10:00\t09:00\n");

    let output = tabtime(temp.path(), &["report", &sheet]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("line 2: duration negative, stop time before start time"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_config_file_sets_defaults() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(&temp, "t\n2023-08-01\t8:00\t9:00\tPlanning work, then coding\n");
    let config = temp.path().join("tabtime.toml");
    std::fs::write(&config, "rate = \"80\"\nformat = \"json\"\n").unwrap();

    let output = tabtime(
        temp.path(),
        &["--config", &config.to_string_lossy(), "report", &sheet],
    );
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["rate"], "80.00");
    assert_eq!(value["rows"][4]["name"], "Sum");
    assert_eq!(value["rows"][4]["amount"], "80.00");
}

#[test]
fn test_numeric_rate_from_environment() {
    let temp = TempDir::new().unwrap();
    let sheet = write_sheet(&temp, "t\n2023-08-01\t8:00\t9:30\n");

    let output = Command::new(env!("CARGO_BIN_EXE_tabtime"))
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env_remove("RUST_LOG")
        .env("TABTIME_RATE", "120")
        .env_remove("TABTIME_FORMAT")
        .env_remove("TABTIME_DESCRIPTION_LIMIT")
        .env_remove("TABTIME_STRICT")
        .args(["report", "--format", "json", &sheet])
        .output()
        .expect("failed to run tabtime");
    assert!(
        output.status.success(),
        "numeric rate should load: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["rate"], "120.00");
    assert_eq!(value["rows"][4]["amount"], "180.00");
}
