/// End-to-end tests for config file loading, auto-discovery and validation.
///
/// These tests exercise the full flow from config file on disk through CLI invocation
/// to correct output, using `assert_cmd` and `tempfile` for isolated test environments.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Write a config file at the specified path.
fn write_config(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

/// A scenario that dispatches a reboot and checks the agent in.
fn write_reboot_scenario(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("scenario.json");
    let scenario = r#"{
        "agents": [{"agent_id": "a1", "os_code": "linux", "os_string": "Ubuntu 22.04"}],
        "steps": [
            {"action": "dispatch", "label": "reboot", "kind": "reboot", "agent_ids": ["a1"]},
            {"action": "check_in", "agent_id": "a1"}
        ]
    }"#;
    fs::write(&path, scenario).unwrap();
    path
}

/// A scenario installing from the `staging` view.
fn write_staging_scenario(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("scenario.json");
    let scenario = r#"{
        "agents": [{"agent_id": "a1", "os_code": "windows", "os_string": "Windows 11"}],
        "steps": [
            {"action": "ingest", "agent_id": "a1", "apps": [
                {"name": "notepad", "version": "8.6", "status": "installed"}
            ]},
            {"action": "dispatch", "label": "op", "kind": "install_os_apps",
             "agent_ids": ["a1"], "app_ids": ["abc"], "view": "staging"}
        ]
    }"#;
    fs::write(&path, scenario).unwrap();
    path
}

const STAGING_CONFIG: &str = r#"packages_root: packages
views:
  staging:
    package_base_url: https://staging.example.com/packages
    file_servers:
      - mirror.staging.example.com
"#;

// ============================================================================
// check-config
// ============================================================================

#[test]
fn test_check_config_explicit_path() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.yml");
    write_config(
        &config_path,
        r#"packages_root: /srv/packages
download:
  max_concurrent_jobs: 8
  default_throttle_kbs: 512
agent_queue:
  server_ttl_minutes: 30
views:
  default:
    package_base_url: https://packages.example.com/packages
"#,
    );

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["check-config", "--config"])
        .arg(&config_path)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Configuration is valid"))
        .stderr(predicate::str::contains("/srv/packages"))
        .stderr(predicate::str::contains("8 worker(s)"))
        .stderr(predicate::str::contains("throttle 512 KB/s"))
        .stderr(predicate::str::contains("server TTL 30m"))
        .stderr(predicate::str::contains("view: default"));
}

#[test]
fn test_check_config_auto_discovery() {
    let dir = TempDir::new().unwrap();
    write_config(&dir.path().join("fleet-patch.config.yml"), STAGING_CONFIG);

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .arg("check-config")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("view: staging"));
}

#[test]
fn test_check_config_defaults_without_file() {
    let dir = TempDir::new().unwrap();

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .arg("check-config")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("4 worker(s)"))
        .stderr(predicate::str::contains("job timeout 86400s"))
        .stderr(predicate::str::contains("agent TTL 10m"));
}

#[test]
fn test_check_config_missing_explicit_file() {
    let dir = TempDir::new().unwrap();

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["check-config", "--config", "nonexistent.yml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_check_config_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("bad.yml");
    write_config(&config_path, "views: [unclosed");

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["check-config", "--config"])
        .arg(&config_path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_check_config_rejects_zero_workers() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("zero.yml");
    write_config(&config_path, "download:\n  max_concurrent_jobs: 0\n");

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["check-config", "--config"])
        .arg(&config_path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_concurrent_jobs must be at least 1"))
        .stderr(predicate::str::contains("Hint"));
}

#[test]
fn test_check_config_rejects_non_http_base_url() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("ftp.yml");
    write_config(
        &config_path,
        "views:\n  default:\n    package_base_url: ftp://packages.example.com\n",
    );

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["check-config", "--config"])
        .arg(&config_path)
        .assert()
        .code(2);
}

#[test]
fn test_unknown_config_field_warns() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir.path().join("fleet-patch.config.yml"),
        "packages_root: packages\nmystery_option: true\n",
    );

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .arg("check-config")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("unknown config field will be ignored"))
        .stderr(predicate::str::contains("mystery_option"));
}

// ============================================================================
// replay with config
// ============================================================================

#[test]
fn test_replay_uses_discovered_views() {
    let dir = TempDir::new().unwrap();
    write_config(&dir.path().join("fleet-patch.config.yml"), STAGING_CONFIG);
    let scenario = write_staging_scenario(dir.path());

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["replay", "--scenario"])
        .arg(&scenario)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"work_items_queued\": 0"));
}

#[test]
fn test_replay_without_view_config_fails() {
    let dir = TempDir::new().unwrap();
    let scenario = write_staging_scenario(dir.path());

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["replay", "--scenario"])
        .arg(&scenario)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("view 'staging' has no download configuration"));
}

#[test]
fn test_replay_explicit_config_overrides_discovery() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir.path().join("fleet-patch.config.yml"),
        "download:\n  max_concurrent_jobs: 0\n",
    );
    let explicit = dir.path().join("explicit.yml");
    write_config(&explicit, STAGING_CONFIG);
    let scenario = write_staging_scenario(dir.path());

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["replay", "--scenario"])
        .arg(&scenario)
        .arg("--config")
        .arg(&explicit)
        .assert()
        .code(0);
}

#[test]
fn test_replay_rejects_packages_root_file() {
    let dir = TempDir::new().unwrap();
    let scenario = write_reboot_scenario(dir.path());
    let not_a_dir = dir.path().join("packages-file");
    fs::write(&not_a_dir, "x").unwrap();

    cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["replay", "--scenario"])
        .arg(&scenario)
        .arg("--packages-root")
        .arg(&not_a_dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("packages_root is not a directory"));
}

#[test]
fn test_replay_reboot_with_custom_ttl() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir.path().join("fleet-patch.config.yml"),
        "agent_queue:\n  server_ttl_minutes: 1\n  agent_ttl_minutes: 2\n",
    );
    let scenario = write_reboot_scenario(dir.path());

    let assert = cargo_bin_cmd!("fleet-patch")
        .current_dir(dir.path())
        .args(["replay", "--scenario"])
        .arg(&scenario)
        .assert()
        .code(0);

    let summary: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let item = &summary["steps"][1]["response"]["delivered"][0];
    let created: chrono::DateTime<chrono::Utc> =
        item["created_at"].as_str().unwrap().parse().unwrap();
    let server: chrono::DateTime<chrono::Utc> =
        item["server_expires_at"].as_str().unwrap().parse().unwrap();
    let agent: chrono::DateTime<chrono::Utc> =
        item["agent_expires_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(server - created, chrono::Duration::minutes(1));
    assert_eq!(agent - server, chrono::Duration::minutes(2));
}
