use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const CONVERTED: &str = "{\n    \"expected\": 1,\n    \"other\": 2\n}";

fn rekey() -> Command {
    Command::cargo_bin("rekey").unwrap()
}

#[test]
fn plain_run_rewrites_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("q.json"), r#"{"with": 1, "other": 2}"#).unwrap();

    rekey()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"["q.json"]"#))
        .stdout(predicate::str::contains("Renamed 1 of 1 entries"));

    assert_eq!(fs::read_to_string(dir.path().join("q.json")).unwrap(), CONVERTED);
}

#[test]
fn directory_argument_is_used() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("q.json"), r#"{"with": 1, "other": 2}"#).unwrap();

    rekey().arg(dir.path()).assert().success();

    assert_eq!(fs::read_to_string(dir.path().join("q.json")).unwrap(), CONVERTED);
}

#[test]
fn invalid_json_fails_and_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    rekey()
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("notes.txt"))
        .stderr(predicate::str::contains("is not valid JSON"));

    assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "hello");
}

#[test]
fn sub_directory_stops_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    rekey()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a regular file"));
}

#[test]
fn second_run_reports_missing_key() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("q.json"), r#"{"with": 1, "other": 2}"#).unwrap();

    rekey().arg(dir.path()).assert().success();
    rekey()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no top-level key 'with'"));

    assert_eq!(fs::read_to_string(dir.path().join("q.json")).unwrap(), CONVERTED);
}

#[test]
fn skip_dirs_ignores_sub_directories() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("q.json"), r#"{"with": 1, "other": 2}"#).unwrap();

    rekey()
        .arg("--skip-dirs")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));

    assert_eq!(fs::read_to_string(dir.path().join("q.json")).unwrap(), CONVERTED);
}

#[test]
fn keep_going_converts_files_after_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.json"), "{").unwrap();
    fs::write(dir.path().join("good.json"), r#"{"with": 1, "other": 2}"#).unwrap();

    rekey()
        .arg("--keep-going")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 entries failed"));

    assert_eq!(fs::read_to_string(dir.path().join("good.json")).unwrap(), CONVERTED);
    assert_eq!(fs::read_to_string(dir.path().join("bad.json")).unwrap(), "{");
}

#[test]
fn json_mode_emits_events() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("q.json"), r#"{"with": 1, "other": 2}"#).unwrap();

    let output = rekey()
        .args(["--mode", "json"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let kinds: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, ["listing", "progress", "output"]);

    assert_eq!(events[0]["data"][0]["name"], "q.json");
    assert_eq!(events[1]["data"]["status"], "renamed");

    let report = &events[2]["data"];
    assert_eq!(report["halted"], false);
    assert_eq!(report["counts"]["renamed"], 1);
    assert_eq!(report["entries"][0]["status"], "renamed");
}

#[test]
fn json_mode_reports_failure_codes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("q.json"), r#"{"other": 2}"#).unwrap();

    let output = rekey()
        .args(["--mode=json"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let last: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(last["type"], "output");
    assert_eq!(last["data"]["halted"], true);
    assert_eq!(last["data"]["entries"][0]["code"], "missing_key");
}

#[test]
fn missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    rekey()
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to list"));
}

#[test]
fn file_given_as_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.json");
    fs::write(&path, r#"{"with": 1}"#).unwrap();

    rekey()
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to list"))
        .stderr(predicate::str::contains("is not a directory"));

    assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"with": 1}"#);
}

#[test]
fn empty_directory_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();

    rekey()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to rename."));
}
