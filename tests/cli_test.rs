//! CLI surface tests. Store-backed commands run against isolated temp
//! directories; nothing here needs a browser.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command whose config, data, and rule store all live in a temp dir.
fn isolated_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("element-hider").unwrap();
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env(
            "ELEMENT_HIDER_STORAGE_FILE",
            dir.path().join("rules.json"),
        );
    cmd
}

#[test]
fn help_lists_the_command_surface() {
    let mut cmd = Command::cargo_bin("element-hider").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hide"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("pick"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("rules"))
        .stdout(predicate::str::contains("viewport"));
}

#[test]
fn version_flag_works() {
    let mut cmd = Command::cargo_bin("element-hider").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("element-hider"));
}

#[test]
fn rules_list_reports_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rules stored"));
}

#[test]
fn rules_list_json_is_an_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["--json", "rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn rules_clear_succeeds_on_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["rules", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All rules cleared"));
}

#[test]
fn toggling_an_unknown_rule_fails() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["rules", "toggle", "#x", "https://a.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RuleNotFound"));
}

#[test]
fn lang_defaults_to_english() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .arg("lang")
        .assert()
        .success()
        .stdout(predicate::str::contains("en"));
}

#[test]
fn lang_set_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    isolated_cmd(&dir)
        .args(["lang", "zh_CN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zh_CN"));

    isolated_cmd(&dir)
        .arg("lang")
        .assert()
        .success()
        .stdout(predicate::str::contains("zh_CN"));
}

#[test]
fn lang_falls_back_to_english_for_unknown_tags() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["lang", "klingon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en"));
}

#[test]
fn hide_requires_a_target() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .arg("hide")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide x and y coordinates"));
}

#[test]
fn hide_without_a_browser_reports_not_running() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["hide", "--selector", "#x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BrowserNotRunning"));
}

#[test]
fn viewport_without_a_browser_reports_not_running() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .arg("viewport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BrowserNotRunning"));
}

#[test]
fn config_path_prints_a_location() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_get_reports_defaults() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["config", "get", "browser.cdp_port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9222"));
}

#[test]
fn config_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(&dir)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure();
}
