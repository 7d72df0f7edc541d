//! End-to-end tests for the `sessions` subcommands

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn llamachat(db_path: &Path, config_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("llamachat").expect("binary built");
    cmd.env_remove("LLAMACHAT_DB")
        .env_remove("LLAMACPP_IP")
        .env("RUST_LOG", "off")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config_path)
        .arg("--db-path")
        .arg(db_path);
    cmd
}

#[test]
fn test_sessions_lifecycle_through_cli() {
    let (tmp, config_path) = common::temp_config_file("chat:\n  title_length: 7\n");
    let db_path = tmp.path().join("cli.db");

    llamachat(&db_path, &config_path)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No chat sessions found"));

    llamachat(&db_path, &config_path)
        .args(["sessions", "new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Conversation 1"));

    llamachat(&db_path, &config_path)
        .args(["sessions", "new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Conversation 2"));

    llamachat(&db_path, &config_path)
        .args(["sessions", "rename", "2", "New Conversation 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Conversation 1 (1)"));

    llamachat(&db_path, &config_path)
        .args(["sessions", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted New Conversation 1"));

    llamachat(&db_path, &config_path)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Conversation 1 (1)"));
}

#[test]
fn test_unknown_session_fails_cleanly() {
    let (tmp, config_path) = common::temp_config_file("{}\n");
    let db_path = tmp.path().join("cli.db");

    llamachat(&db_path, &config_path)
        .args(["sessions", "show", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session not found"));
}

#[test]
fn test_invalid_config_temperature_is_rejected() {
    let (tmp, config_path) = common::temp_config_file("provider:\n  temperature: 3.5\n");
    let db_path = tmp.path().join("cli.db");

    llamachat(&db_path, &config_path)
        .args(["sessions", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Temperature must be between"));
}

#[test]
fn test_chat_starts_despite_corrupt_session_row() {
    let (tmp, config_path) =
        common::temp_config_file("provider:\n  host: 127.0.0.1:9\n");
    let db_path = tmp.path().join("cli.db");

    llamachat(&db_path, &config_path)
        .args(["sessions", "new"])
        .assert()
        .success();

    let conn = rusqlite::Connection::open(&db_path).expect("open sqlite");
    conn.execute(
        "INSERT INTO sessions (id, name, messages) VALUES ('bad', 'Bad', '{oops')",
        [],
    )
    .expect("seed corrupt row");
    drop(conn);

    llamachat(&db_path, &config_path)
        .arg("chat")
        .write_stdin("/sessions\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("New Conversation 1"))
        .stdout(predicate::str::contains("Goodbye!"))
        .stderr(predicate::str::contains("Corrupted messages for session bad"));

    // the damaged row is kept, not overwritten
    let conn = rusqlite::Connection::open(&db_path).expect("open sqlite");
    let raw: String = conn
        .query_row("SELECT messages FROM sessions WHERE id = 'bad'", [], |row| {
            row.get(0)
        })
        .expect("corrupt row still present");
    assert_eq!(raw, "{oops");
}

#[test]
fn test_list_hints_at_archiving_past_threshold() {
    let (tmp, config_path) = common::temp_config_file("chat:\n  large_session_warning: 1\n");
    let db_path = tmp.path().join("cli.db");

    llamachat(&db_path, &config_path)
        .args(["sessions", "new"])
        .assert()
        .success();

    llamachat(&db_path, &config_path)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Consider deleting or archiving").not());

    llamachat(&db_path, &config_path)
        .args(["sessions", "new"])
        .assert()
        .success();

    llamachat(&db_path, &config_path)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You have 2 sessions"))
        .stdout(predicate::str::contains("Consider deleting or archiving"));
}
