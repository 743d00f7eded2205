//! Runs the compiled `docproc` binary.

use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn docproc() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_docproc"));
    command.env("RUST_LOG", "off");
    command
}

#[test]
fn test_process_csv_prints_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.csv");
    fs::write(&path, "id,name\n1,Alice\n2,Bob\n").unwrap();

    let output = docproc().current_dir(dir.path()).arg("process").arg(&path).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["documentName"], "people.csv");
    assert_eq!(json["success"], true);
    assert_eq!(json["extractedData"][1]["name"], "Bob");
}

#[test]
fn test_failed_result_exits_non_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "\n\n").unwrap();

    let output = docproc()
        .current_dir(dir.path())
        .args(["process", "--format", "text"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("CSV file is empty"));
}

#[test]
fn test_size_limit_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "a,b\n1,2\n").unwrap();
    let config = dir.path().join("limits.json");
    fs::write(&config, r#"{"limits": {"max_file_size_bytes": 2}}"#).unwrap();

    let output = docproc().arg("--config").arg(&config).arg("process").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeding the limit of 2 bytes"));
}

#[test]
fn test_supports_and_extensions() {
    let dir = tempdir().unwrap();

    let output = docproc().current_dir(dir.path()).args(["supports", ".DOCX"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");

    let output = docproc().current_dir(dir.path()).args(["supports", "odt"]).output().unwrap();
    assert!(!output.status.success());

    let output = docproc().current_dir(dir.path()).arg("extensions").output().unwrap();
    let listed: Vec<String> = String::from_utf8_lossy(&output.stdout).lines().map(str::to_string).collect();
    assert_eq!(listed, vec!["csv", "doc", "docx", "pdf", "xls", "xlsx"]);
}
