use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_help_lists_server_flags() {
    let mut cmd = Command::new(cargo_bin!("paylab"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--addr"))
        .stdout(predicate::str::contains("--secret"))
        .stdout(predicate::str::contains("--timeout-hold-ms"));
}

#[test]
fn test_unknown_flag_fails() {
    let mut cmd = Command::new(cargo_bin!("paylab"));
    cmd.arg("--definitely-not-a-flag");

    cmd.assert().failure();
}
