//! End-to-end tests for the spoolscan binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("spoolscan").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_parse_text_invoice_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("jaycar-004.txt");
    std::fs::write(
        &input,
        "Jaycar Pty Ltd\nTax Invoice Number 00012345\nTX1234  3mm Black PLA Filament  2  $20.00  $40.00\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("spoolscan").unwrap();
    cmd.arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("TX1234"))
        .stdout(predicate::str::contains("\"supplier\":\"jaycar\""))
        .stdout(predicate::str::contains("\"qtyKg\":2"));
}

#[test]
fn test_parse_csv_format_has_headers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("jaycar-004.txt");
    std::fs::write(
        &input,
        "Jaycar Pty Ltd\nTX1234  3mm Black PLA Filament  2  $20.00  $40.00\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("spoolscan").unwrap();
    cmd.arg("parse")
        .arg(&input)
        .arg("--format")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("sku,manufacturer,material,variant,pack,qtyKg"))
        .stdout(predicate::str::contains("TX1234,3mm,PLA"));
}

#[test]
fn test_parse_missing_input_fails() {
    let mut cmd = Command::cargo_bin("spoolscan").unwrap();
    cmd.arg("parse")
        .arg("/nonexistent/invoice.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_ingest_empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("spoolscan").unwrap();
    cmd.arg("ingest")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No invoice PDFs found"));
}

#[test]
fn test_config_path_prints_location() {
    let mut cmd = Command::cargo_bin("spoolscan").unwrap();
    cmd.arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}
