#![allow(deprecated)] // Command::cargo_bin is deprecated in newer assert_cmd releases

use assert_cmd::Command;
use predicates::prelude::*;

fn ionos() -> Command {
    let mut cmd = Command::cargo_bin("ionos").unwrap();
    for var in [
        "IONOS_TOKEN",
        "IONOS_USERNAME",
        "IONOS_PASSWORD",
        "IONOS_CONFIG_FILE",
        "IONOS_LOCATION",
        "IONOS_TIMEOUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Top-level help lists every command group
#[test]
fn test_cli_help() {
    ionos()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pipeline"))
        .stdout(predicate::str::contains("access-key"))
        .stdout(predicate::str::contains("region"))
        .stdout(predicate::str::contains("state"))
        .stdout(predicate::str::contains("--location"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--deadline"));
}

#[test]
fn test_cli_version() {
    ionos()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ionos"));
}

#[test]
fn test_pipeline_help() {
    ionos()
        .args(["pipeline", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_pipeline_create_requires_name() {
    ionos()
        .args(["pipeline", "create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_access_key_find_requires_filter() {
    ionos()
        .args(["access-key", "find"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--description"));
}

/// Without credentials the command fails before any request
#[test]
fn test_missing_credentials() {
    let dir = tempfile::tempdir().unwrap();
    ionos()
        .env("IONOS_CONFIG_FILE", dir.path().join("missing.yaml"))
        .args(["pipeline", "get", "p-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

/// Oversized durations are rejected instead of overflowing
#[test]
fn test_huge_durations_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for flag in ["--timeout", "--deadline"] {
        ionos()
            .env("IONOS_TOKEN", "test-token")
            .args([flag, "307445734561825861m", "pipeline", "get", "p-1", "--state-dir"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("too large"));
    }
}

#[test]
fn test_state_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    ionos()
        .args(["state", "list", "--state-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracked resources"));
}

#[test]
fn test_state_list_shows_tracked_resources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".ionos")).unwrap();
    std::fs::write(
        dir.path().join(".ionos/state.json"),
        r#"{
            "version": 1,
            "updated_at": "2024-05-02T10:11:12Z",
            "resources": {
                "pipeline:p-1": {
                    "kind": "pipeline",
                    "id": "p-1",
                    "location": "de/fra",
                    "status": "AVAILABLE",
                    "attributes": {},
                    "created_at": "2024-05-02T10:11:12Z",
                    "updated_at": "2024-05-02T10:11:12Z"
                }
            }
        }"#,
    )
    .unwrap();

    ionos()
        .args(["state", "list", "--state-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("p-1"))
        .stdout(predicate::str::contains("de/fra"));
}
