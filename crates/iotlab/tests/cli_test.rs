//! Integration tests for the `iotlab` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes, plus
//! a few end-to-end runs against a wiremock API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `iotlab` with env isolation: no `IOTLAB_*` variables and config
/// directories pointing at a nonexistent path.
fn iotlab_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("iotlab");
    cmd.env("HOME", "/tmp/iotlab-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/iotlab-cli-test-nonexistent")
        .env_remove("IOTLAB_API_URL")
        .env_remove("IOTLAB_USERNAME")
        .env_remove("IOTLAB_PASSWORD")
        .env_remove("IOTLAB_INSECURE")
        .env_remove("IOTLAB_CA_CERT")
        .env_remove("IOTLAB_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn api_url(server: &MockServer) -> String {
    format!("{}/rest/", server.uri())
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = iotlab_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    iotlab_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("IoT-LAB")
            .and(predicate::str::contains("experiment"))
            .and(predicate::str::contains("node"))
            .and(predicate::str::contains("profile"))
            .and(predicate::str::contains("sites")),
    );
}

#[test]
fn test_version_flag() {
    iotlab_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iotlab"));
}

#[test]
fn test_experiment_submit_help() {
    iotlab_cmd()
        .args(["experiment", "submit", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--duration")
                .and(predicate::str::contains("--list"))
                .and(predicate::str::contains("--firmware")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    iotlab_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    iotlab_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iotlab"));
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_unknown_option_is_usage_error() {
    iotlab_cmd()
        .args(["experiment", "list", "--bogus"])
        .assert()
        .code(2);
}

#[test]
fn test_submit_requires_duration() {
    iotlab_cmd()
        .args(["experiment", "submit", "-l", "m3-1.grenoble.iot-lab.info"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--duration"));
}

#[test]
fn test_get_options_are_exclusive() {
    iotlab_cmd()
        .args(["experiment", "get", "-i", "42", "--state", "--archive"])
        .assert()
        .code(2);
}

#[test]
fn test_profile_get_needs_name_or_list() {
    iotlab_cmd().args(["profile", "get"]).assert().code(2);
}

#[test]
fn test_missing_credentials_exit_code() {
    let output = iotlab_cmd()
        .args(["--api-url", "http://127.0.0.1:9/rest/", "profile", "get", "--list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No credentials"));
}

#[test]
fn test_configured_user_without_password_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("iotlab")).unwrap();
    std::fs::write(
        dir.path().join("iotlab/config.toml"),
        "username = \"iotlab-cli-test-nobody\"\napi_url = \"http://127.0.0.1:9/rest/\"\n",
    )
    .unwrap();

    let output = iotlab_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["profile", "get", "--list"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No credentials"));
}

#[test]
fn test_profile_load_without_name() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("profile.json");
    std::fs::write(&file, r#"{"power": "dc"}"#).unwrap();

    iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", "http://127.0.0.1:9/rest/"])
        .args(["profile", "load", "-f"])
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("profilename"));
}

// ── End-to-end against a mock API ───────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_lists_names_without_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/experiments"))
        .and(query_param("sites", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"site": "grenoble"}, {"site": "lille"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    iotlab_cmd()
        .args(["--api-url", &api_url(&server), "-o", "json-compact", "sites"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[\"grenoble\",\"lille\"]\n"));

    let received = server.received_requests().await.unwrap();
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_experiment_list_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/experiments"))
        .and(query_param("state", "Running"))
        .and(basic_auth("alice", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 42, "name": "demo", "state": "Running"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", &api_url(&server)])
        .args(["-o", "table", "experiment", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("42")
                .and(predicate::str::contains("demo"))
                .and(predicate::str::contains("Running")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_resolves_running_experiment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/experiments"))
        .and(query_param("state", "Running"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": 42}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/experiments/42"))
        .and(basic_auth("alice", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "status": "Delete request registered"})))
        .expect(1)
        .mount(&server)
        .await;

    iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", &api_url(&server)])
        .args(["--yes", "experiment", "stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete request registered"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_archive_written_to_file() {
    let server = MockServer::start().await;
    let archive = vec![0x1f, 0x8b, 0x08, 0x00, 0xff, 0xfe];
    Mock::given(method("GET"))
        .and(path("/rest/experiments/42"))
        .and(query_param("data", ""))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive.clone()))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    iotlab_cmd()
        .current_dir(dir.path())
        .args(["-u", "alice", "-p", "secret", "--api-url", &api_url(&server)])
        .args(["experiment", "get", "-i", "42", "--archive"])
        .assert()
        .success()
        .stderr(predicate::str::contains("42.tar.gz"));

    assert_eq!(std::fs::read(dir.path().join("42.tar.gz")).unwrap(), archive);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/profiles/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("profile not found"))
        .mount(&server)
        .await;

    let output = iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", &api_url(&server)])
        .args(["profile", "get", "-n", "missing"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("profile not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_del_prints_text() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/profiles/old"))
        .respond_with(ResponseTemplate::new(200).set_body_string("profile deleted"))
        .expect(1)
        .mount(&server)
        .await;

    iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", &api_url(&server)])
        .args(["profile", "del", "-n", "old"])
        .assert()
        .success()
        .stdout(predicate::str::diff("profile deleted\n"));
}

#[test]
fn test_profile_json_flag_prints_without_upload() {
    let output = iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", "http://127.0.0.1:9/rest/"])
        .args(["-o", "json-compact", "profile", "adda8", "-n", "idle", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        printed,
        json!({"profilename": "idle", "nodearch": "a8", "power": "dc"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_addwsn430_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/profiles/env"))
        .and(basic_auth("alice", "secret"))
        .and(body_json(json!({
            "profilename": "env",
            "nodearch": "wsn430",
            "power": "battery",
            "sensor": {"frequency": 5000, "temperature": true, "luminosity": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("profile added"))
        .expect(1)
        .mount(&server)
        .await;

    iotlab_cmd()
        .args(["-u", "alice", "-p", "secret", "--api-url", &api_url(&server)])
        .args(["profile", "addwsn430", "-n", "env", "--power", "battery"])
        .args(["--sfreq", "5000", "--temperature", "--luminosity"])
        .assert()
        .success()
        .stdout(predicate::str::diff("profile added\n"));
}
