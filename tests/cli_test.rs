mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{is_empty_dir, write_noise, MB};

fn reclaim(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reclaim").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join(".local/share"))
        .env_remove("RECLAIM_LOG")
        .arg("--no-color");
    cmd
}

fn home_with_npm_cache() -> TempDir {
    let home = TempDir::new().unwrap();
    write_noise(&home.path().join(".npm/_cacache/content-v2/aa"), 2 * MB);
    home
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("developer caches"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("empty-trash"))
        .stdout(predicate::str::contains("forecast"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reclaim"));
}

// ─── Scan command ────────────────────────────────────────────────────────────

#[test]
fn test_scan_json_output() {
    let home = home_with_npm_cache();
    reclaim(&home)
        .args(["--format", "json", "scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cleanable\""))
        .stdout(predicate::str::contains("npm Cache"));
}

#[test]
fn test_scan_human_output() {
    let home = home_with_npm_cache();
    reclaim(&home)
        .args(["scan", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("npm Cache"));
}

// ─── Clean command ───────────────────────────────────────────────────────────

#[test]
fn test_clean_requires_a_selection() {
    let home = TempDir::new().unwrap();
    reclaim(&home).arg("clean").assert().failure();
}

#[test]
fn test_clean_safe_moves_cache_contents() {
    let home = home_with_npm_cache();
    let cache = home.path().join(".npm/_cacache");
    reclaim(&home)
        .args(["--format", "json", "clean", "--safe", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"recovered_bytes\""));
    assert!(is_empty_dir(&cache));
    if cfg!(target_os = "linux") {
        let trash = home.path().join(".local/share/Trash");
        assert!(trash.join("files/content-v2").exists());
        assert!(trash.join("info/content-v2.trashinfo").exists());
    }

    reclaim(&home)
        .args(["--format", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_saved\": 0").not());
}

#[test]
fn test_clean_dry_run_keeps_files() {
    let home = home_with_npm_cache();
    reclaim(&home)
        .args(["clean", "--all", "--dry-run"])
        .assert()
        .success();
    assert!(home.path().join(".npm/_cacache/content-v2/aa").exists());
}

#[test]
fn test_clean_unknown_item_fails() {
    let home = home_with_npm_cache();
    let missing = home.path().join("not-a-cache");
    reclaim(&home)
        .args(["clean", "-y", "--item"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("None of the given paths"));
}

#[test]
fn test_clean_single_item() {
    let home = home_with_npm_cache();
    write_noise(&home.path().join("Library/Caches/pip/http/cc"), 2 * MB);
    reclaim(&home)
        .args(["clean", "-y", "--item"])
        .arg(home.path().join(".npm/_cacache/"))
        .assert()
        .success();
    assert!(is_empty_dir(&home.path().join(".npm/_cacache")));
    assert!(home.path().join("Library/Caches/pip/http/cc").exists());
}

// ─── Trash, status, onboarding ───────────────────────────────────────────────

#[test]
fn test_empty_trash_when_empty() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .args(["empty-trash", "-y"])
        .assert()
        .success();
}

#[test]
fn test_status_json() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .args(["--format", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_saved\""))
        .stdout(predicate::str::contains("\"is_first_launch\": true"));
}

#[test]
fn test_onboard_persists() {
    let home = TempDir::new().unwrap();
    reclaim(&home).arg("onboard").assert().success();
    reclaim(&home)
        .args(["--format", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_first_launch\": false"));
}

#[test]
fn test_forecast_quiet_without_history() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .args(["--quiet", "forecast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown"));
}

// ─── Config & completions ────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".reclaim/config.toml"));
}

#[test]
fn test_config_show_is_toml() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cache_min_bytes"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    reclaim(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reclaim"));
}
