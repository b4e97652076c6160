use assert_cmd::Command;
use predicates::prelude::*;

fn pomodoro() -> Command {
    Command::cargo_bin("pomodoro").unwrap()
}

#[test]
fn test_help_lists_session_flags() {
    pomodoro()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--work"))
        .stdout(predicate::str::contains("--short-break"))
        .stdout(predicate::str::contains("--long-break"))
        .stdout(predicate::str::contains("--cycles"))
        .stdout(predicate::str::contains("--no-sound"));
}

#[test]
fn test_zero_work_minutes_is_rejected() {
    pomodoro()
        .args(["--work", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Work must be greater than 0"));
}

#[test]
fn test_negative_cycles_are_rejected() {
    pomodoro()
        .args(["--cycles", "-2", "--no-sound"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cycles before long break must be greater than 0"));
}

#[test]
fn test_non_numeric_duration_is_a_usage_error() {
    pomodoro()
        .args(["--long-break", "soon"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}
