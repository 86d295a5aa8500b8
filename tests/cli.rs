use assert_cmd::Command;
use predicates::prelude::*;

fn qrterm() -> Command {
    Command::cargo_bin("qrterm").unwrap()
}

#[test]
fn test_help_lists_render_modes() {
    qrterm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--large").and(predicate::str::contains("--compact")));
}

#[test]
fn test_argument_plus_piped_stdin_is_refused() {
    qrterm()
        .arg("hello")
        .assert()
        .failure()
        .stderr(predicate::str::contains("both an argument and piped stdin"));
}

#[test]
fn test_empty_stdin_is_refused() {
    qrterm()
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no payload"));
}

#[test]
fn test_renders_from_stdin_without_escapes() {
    let assert = qrterm()
        .args(["-b", "1"])
        .write_stdin("HELLO WORLD")
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    // Piped stdout is not a terminal, so no color even without --plain
    assert!(!out.contains('\u{1b}'));
    // Version 1 at border 1: 23 module rows pair into 12 lines, plus the
    // trailing bottom edge
    assert_eq!(out.lines().count(), 13);
}

#[test]
fn test_large_mode_doubles_width() {
    let assert = qrterm()
        .args(["--large", "-b", "1"])
        .write_stdin("HELLO WORLD")
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 23);
    assert_eq!(lines[0].chars().count(), 46);
    assert!(lines[0].chars().all(|c| c == '█'));
}

#[test]
fn test_compact_mode_quarters_height() {
    let assert = qrterm()
        .args(["--compact", "-b", "1"])
        .write_stdin("HELLO WORLD")
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(out.lines().count(), 13);
    assert_eq!(out.lines().next().unwrap().chars().count(), 12);
}

#[test]
fn test_border_out_of_range_is_rejected() {
    qrterm().args(["-b", "9"]).write_stdin("x").assert().failure();
}

#[test]
fn test_numeric_mode_rejects_letters() {
    qrterm()
        .args(["-m", "n"])
        .write_stdin("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("numeric"));
}

#[test]
fn test_minimum_version_grows_the_symbol() {
    let assert = qrterm()
        .args(["-v", "5", "-b", "1", "-p"])
        .write_stdin("HELLO WORLD")
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    // Version 5 is 37 modules; with the border that is 39 rows in 20 lines
    assert_eq!(out.lines().count(), 21);
}

#[test]
fn test_animate_refuses_non_byte_mode() {
    qrterm()
        .args(["-a", "-m", "n"])
        .write_stdin("123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("byte mode"));
}

#[test]
fn test_animate_off_terminal_terminates() {
    let payload = "x".repeat(150);
    let assert = qrterm()
        .arg("--animate")
        .write_stdin(payload)
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    // Two frames written once each, no cursor movement
    assert!(!out.contains("\u{1b}[1A"));
    assert!(!out.is_empty());
    let total = out.lines().count();
    assert_eq!(total % 2, 0, "two frames of equal height");
}
