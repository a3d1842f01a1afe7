//! Command-line behaviour that does not need a real statement.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stmtx(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stmtx").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL");
    cmd
}

#[test]
fn parse_missing_file_fails() {
    let home = TempDir::new().unwrap();
    stmtx(&home)
        .args(["parse", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn openai_without_key_is_a_configuration_error() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("statement.pdf");
    std::fs::write(&input, b"not even a pdf").unwrap();

    stmtx(&home)
        .arg("parse")
        .arg(&input)
        .args(["--bank", "openai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn invalid_pdf_is_reported() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("statement.pdf");
    std::fs::write(&input, b"not even a pdf").unwrap();

    stmtx(&home)
        .arg("parse")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse PDF"));
}

#[test]
fn config_init_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");
    let config = config.to_str().unwrap();

    stmtx(&home)
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    stmtx(&home)
        .args(["--config", config, "config", "set", "remote.model", "gpt-4o"])
        .assert()
        .success();

    stmtx(&home)
        .args(["--config", config, "config", "get", "remote.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-4o"));

    stmtx(&home)
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = home.path().join("*.pdf");

    stmtx(&home)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}
