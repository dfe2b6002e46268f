#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

const USAGE: i32 = 64;
const DATA_INVALID: i32 = 60;
const TRANSPORT_ERROR: i32 = 3;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/serframe-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn serframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_serframe"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("serframe should run")
}

fn missing_port() -> String {
    format!("/dev/serframe-missing-{}", std::process::id())
}

#[test]
fn version_prints_name_and_version() {
    let output = serframe(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("serframe {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_lists_backend() {
    let output = serframe(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: serframe"));
    assert!(stdout.contains("backend: serialport"));
}

#[test]
fn read_from_missing_port_is_transport_error() {
    let port = missing_port();
    let output = serframe(&["read", &port]);
    assert_eq!(output.status.code(), Some(TRANSPORT_ERROR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"), "stderr: {stderr}");
}

#[test]
fn invalid_terminator_is_usage_error() {
    let port = missing_port();
    let output = serframe(&["read", &port, "--terminator", "0"]);
    assert_eq!(output.status.code(), Some(USAGE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid terminator"), "stderr: {stderr}");
}

#[test]
fn zero_attempts_is_usage_error() {
    let port = missing_port();
    let output = serframe(&["listen", &port, "--attempts", "0"]);
    assert_eq!(output.status.code(), Some(USAGE));
}

#[test]
fn malformed_hex_fails_before_opening_port() {
    let port = missing_port();
    let output = serframe(&["send", &port, "--hex", "0G"]);
    assert_eq!(output.status.code(), Some(DATA_INVALID));
}

#[test]
fn send_without_payload_is_usage_error() {
    let port = missing_port();
    let output = serframe(&["send", &port]);
    assert_eq!(output.status.code(), Some(USAGE));
}

#[test]
fn send_to_missing_port_fails() {
    let port = missing_port();
    let output = serframe(&["send", &port, "--data", "AT\r"]);
    assert_eq!(output.status.code(), Some(TRANSPORT_ERROR));
}

#[test]
fn config_file_with_unknown_field_is_usage_error() {
    let dir = unique_temp_dir("config");
    let path = dir.join("serframe.json");
    let config = serde_json::json!({ "reader": { "terminator": "0A", "retries": 3 } });
    std::fs::write(&path, config.to_string()).expect("config should be writable");

    let port = missing_port();
    let output = serframe(&["read", &port, "--config", path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(USAGE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn config_file_terminator_is_validated() {
    let dir = unique_temp_dir("config-terminator");
    let path = dir.join("serframe.json");
    let config = serde_json::json!({
        "serial": { "baud_rate": 115200 },
        "reader": { "terminator": "ZZ" }
    });
    std::fs::write(&path, config.to_string()).expect("config should be writable");

    let port = missing_port();
    let output = serframe(&["read", &port, "--config", path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(USAGE));

    let _ = std::fs::remove_dir_all(&dir);
}
