//! Command-line tests for the one-shot sampling mode and argument handling

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use std::time::Duration;
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

const CONFIG_VARS: &[&str] = &[
    "BIND_ADDRESS",
    "SAMPLE_TIMEOUT_MS",
    "REQUEST_TIMEOUT_MS",
    "TIMEOUT_POLICY",
    "ENABLE_COLOR",
    "LOG_FORMAT",
];

/// Command with a clean configuration environment
fn probe_cmd() -> Command {
    let mut cmd = Command::cargo_bin("latency-probe").unwrap();
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--no-color");
    cmd
}

async fn target(status: u16, delay: Option<Duration>) -> MockServer {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(status);
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }
    Mock::given(method("GET")).respond_with(template).mount(&server).await;
    server
}

#[test]
fn test_version_flag() {
    probe_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("latency-probe"));
}

#[test]
fn test_count_without_url_is_rejected() {
    probe_cmd()
        .args(["--count", "3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--count requires --url"));
}

#[test]
fn test_invalid_bind_address_is_rejected() {
    probe_cmd()
        .args(["--bind", "nowhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid bind address"));
}

#[test]
fn test_out_of_range_timeout_is_rejected() {
    probe_cmd()
        .args(["--url", "http://127.0.0.1:1", "--timeout", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Timeout must be greater than 0"));
}

#[test]
fn test_invalid_env_timeout_is_config_error() {
    probe_cmd()
        .env("SAMPLE_TIMEOUT_MS", "soon")
        .args(["--url", "http://127.0.0.1:1", "--count", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"))
        .stderr(predicate::str::contains("SAMPLE_TIMEOUT_MS"));
}

#[test]
fn test_invalid_env_policy_is_config_error() {
    probe_cmd()
        .env("TIMEOUT_POLICY", "retry")
        .args(["--url", "http://127.0.0.1:1", "--count", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"))
        .stderr(predicate::str::contains("TIMEOUT_POLICY"));
}

#[test]
fn test_create_env_writes_example_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.env");

    probe_cmd()
        .arg("--create-env")
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("SAMPLE_TIMEOUT_MS="));
    assert!(content.contains("TIMEOUT_POLICY="));
}

#[test]
fn test_check_env_reports_invalid_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.env");
    std::fs::write(&path, "SAMPLE_TIMEOUT_MS=250\nLOG_FORMAT=xml\n").unwrap();

    probe_cmd()
        .arg("--check-env")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("LOG_FORMAT=xml"))
        .stderr(predicate::str::contains("1 invalid entries"));
}

#[test]
fn test_check_env_accepts_generated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.env");

    probe_cmd().arg("--create-env").arg(&path).assert().success();
    probe_cmd()
        .arg("--check-env")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("no problems found"));
}

#[test]
fn test_check_env_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    probe_cmd()
        .arg("--check-env")
        .arg(dir.path().join("absent.env"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No env file found"));
}

#[test]
fn test_env_help_lists_variables() {
    probe_cmd()
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported Environment Variables"))
        .stdout(predicate::str::contains("REQUEST_TIMEOUT_MS"));
}

#[test]
fn test_zero_samples_prints_empty_results() {
    probe_cmd()
        .args(["--url", "http://unused.invalid", "--count", "0"])
        .assert()
        .success()
        .stdout("{\"measurements\":[],\"averageLatency\":\"0s\"}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_one_shot_against_healthy_target() {
    let server = target(200, None).await;

    let output = probe_cmd()
        .args(["--url", server.uri().as_str(), "--count", "3"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results["measurements"].as_array().unwrap().len(), 3);
    assert!(results["averageLatency"].as_str().unwrap().ends_with('s'));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_one_shot_against_failing_target() {
    let server = target(500, None).await;

    probe_cmd()
        .args(["--url", server.uri().as_str(), "--count", "3"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(format!("unable to open target [{}]", server.uri())));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_one_shot_against_slow_target() {
    let server = target(200, Some(Duration::from_secs(15))).await;

    probe_cmd()
        .args(["--url", server.uri().as_str(), "--count", "2", "--timeout", "100"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("timed out waiting for function to finish"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_json_logs_go_to_stderr() {
    let server = target(200, None).await;

    let output = probe_cmd()
        .args(["--url", server.uri().as_str(), "--count", "1", "--verbose", "--log-format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);

    let stderr = String::from_utf8(output.stderr).unwrap();
    let first_log = stderr.lines().find(|line| line.starts_with('{')).unwrap();
    let entry: serde_json::Value = serde_json::from_str(first_log).unwrap();
    assert!(entry["message"].as_str().unwrap().starts_with("Sampling"));
}
