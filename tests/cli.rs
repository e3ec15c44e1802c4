use assert_cmd::Command;
use predicates::prelude::*;

fn spellwatch() -> Command {
    Command::cargo_bin("spellwatch").unwrap()
}

#[test]
fn help_lists_options_and_subcommands() {
    spellwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--min-length"))
        .stdout(predicate::str::contains("dict"));
}

#[test]
fn completion_script_is_generated() {
    spellwatch()
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spellwatch"));
}

#[test]
fn info_for_unknown_language_suggests_download() {
    spellwatch()
        .args(["--no-color", "dict", "info", "zz_ZZ"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spellwatch dict download zz_ZZ"));
}

#[test]
fn download_rejects_unsupported_language() {
    spellwatch()
        .args(["dict", "download", "fr_FR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn non_numeric_min_length_is_rejected() {
    spellwatch()
        .args(["--min-length", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
