//! Smoke tests for argument wiring and configuration failures

use assert_cmd::Command;
use predicates::prelude::*;

/// Binary with a clean environment: no inherited credentials and an empty
/// home/working directory so no config or .env file is picked up
fn shelfctl(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shelfctl").unwrap();
    cmd.env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_KEY")
        .env_remove("RUST_LOG")
        .env("HOME", dir.path())
        .current_dir(dir.path());
    cmd
}

// === Help Output ===

#[test]
fn test_top_level_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("member"))
        .stdout(predicate::str::contains("borrow"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_book_add_help() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["book", "add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copies on the shelf"));
}

#[test]
fn test_report_help() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("most-borrowed report"));
}

#[test]
fn test_completions_need_no_config() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shelfctl"));
}

// === Configuration ===

#[test]
fn test_missing_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["book", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SUPABASE_URL not set"));
}

#[test]
fn test_missing_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["--url", "https://abc.supabase.co", "book", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SUPABASE_KEY not set"));
}

#[test]
fn test_non_http_url_rejected() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .env("SUPABASE_URL", "ftp://abc.supabase.co")
        .env("SUPABASE_KEY", "k")
        .args(["report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_dotenv_in_working_directory_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "SUPABASE_URL=ftp://from-dotenv.example.com\nSUPABASE_KEY=k\n",
    )
    .unwrap();
    shelfctl(&dir)
        .args(["book", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("from-dotenv.example.com"));
}

#[test]
fn test_bad_integer_argument_rejected_by_parser() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["member", "show", "twelve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'twelve'"));
}

// === Menu ===

#[test]
fn test_menu_exits_on_zero_without_requests() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["--url", "http://127.0.0.1:9", "--key", "k"])
        .write_stdin("0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("12) Reports"))
        .stdout(predicate::str::contains("ERROR").not());
}

#[test]
fn test_menu_invalid_choice_then_eof() {
    let dir = tempfile::tempdir().unwrap();
    shelfctl(&dir)
        .args(["--url", "http://127.0.0.1:9", "--key", "k", "menu"])
        .write_stdin("99\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid choice"));
}
