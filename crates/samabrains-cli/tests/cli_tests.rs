//! Integration tests for the `samabrains` CLI binary.
//!
//! These tests exercise the CLI as a subprocess, verifying exit codes and
//! output. Local validation failures must never reach the network, so most
//! of them point at a port nothing listens on. The few that need a reply
//! use a one-shot HTTP responder on an ephemeral port.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread::JoinHandle;

const DEAD_ENDPOINT: &str = "http://127.0.0.1:19999/api/send-email";

/// Helper: locate the `samabrains` binary built by `cargo test`.
fn samabrains_bin() -> String {
    let path = env!("CARGO_BIN_EXE_samabrains");
    assert!(
        Path::new(path).exists(),
        "samabrains binary not found at {path}"
    );
    path.to_owned()
}

/// Helper: run samabrains with args and return (`exit_code`, stdout, stderr).
fn run(args: &[&str]) -> (i32, String, String) {
    run_against(DEAD_ENDPOINT, args)
}

fn run_against(endpoint: &str, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(samabrains_bin())
        .args(args)
        .env("SAMABRAINS_ENDPOINT", endpoint)
        .output()
        .expect("failed to execute samabrains");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

/// Answer exactly one HTTP request with `status` and a JSON `body`, handing
/// back the request body that was received.
fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/api/send-email", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }

        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        reader.get_mut().write_all(response.as_bytes()).unwrap();
        String::from_utf8(request_body).unwrap()
    });

    (endpoint, handle)
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0, "samabrains --version should exit 0");
    assert!(
        stdout.contains("samabrains"),
        "version output should contain 'samabrains': {stdout}"
    );
}

#[test]
fn test_help_flag() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0, "samabrains --help should exit 0");
    assert!(stdout.contains("SamaBrains CLI"), "help should mention SamaBrains CLI");
    assert!(stdout.contains("send"), "help should list 'send' command");
    assert!(stdout.contains("check"), "help should list 'check' command");
    assert!(
        stdout.contains("SAMABRAINS_ENDPOINT"),
        "help should document the endpoint variable"
    );
}

#[test]
fn test_message_is_required() {
    let (code, _, stderr) = run(&["check", "--name", "Ada", "--email", "ada@example.com"]);
    assert_ne!(code, 0, "check without a message should fail");
    assert!(stderr.contains("--message"), "should name the missing flag: {stderr}");
}

#[test]
fn test_message_and_file_conflict() {
    let (code, _, _) = run(&[
        "check",
        "--name",
        "Ada",
        "--email",
        "ada@example.com",
        "--message",
        "hi",
        "--message-file",
        "note.txt",
    ]);
    assert_ne!(code, 0, "--message and --message-file are exclusive");
}

// ── Check command (no server needed) ─────────────────────────────────

#[test]
fn test_check_accepts_valid_message() {
    let (code, stdout, stderr) = run(&[
        "check",
        "--name",
        "Ada",
        "--email",
        "ada@example.com",
        "--message",
        "Hello",
    ]);
    assert_eq!(code, 0, "valid message should pass: {stderr}");
    assert!(stdout.contains("Ready to send"), "{stdout}");
}

#[test]
fn test_check_reports_local_errors() {
    let cases: [(&[&str], &str); 3] = [
        (
            &["--name", "   ", "--email", "ada@example.com", "--message", "hi"],
            "Please fill in all fields",
        ),
        (
            &["--name", "Ada", "--email", "ada@example", "--message", "hi"],
            "Please enter a valid email address",
        ),
        (
            &["--name", "Ada", "--email", "ada example.com", "--message", "hi"],
            "Please enter a valid email address",
        ),
    ];

    for (args, expected) in cases {
        let mut full = vec!["check"];
        full.extend_from_slice(args);
        let (code, _, stderr) = run(&full);
        assert_eq!(code, 1, "{args:?} should fail");
        assert!(stderr.contains(expected), "{args:?}: {stderr}");
    }
}

#[test]
fn test_check_reads_message_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("note.txt");
    fs::write(&path, "x".repeat(5001)).expect("write failed");

    let (code, _, stderr) = run(&[
        "check",
        "--name",
        "Ada",
        "--email",
        "ada@example.com",
        "--message-file",
        path.to_str().unwrap(),
    ]);
    assert_eq!(code, 1, "oversized message file should fail");
    assert!(stderr.contains("Input too long"), "{stderr}");
}

#[test]
fn test_missing_message_file() {
    let (code, _, stderr) = run(&[
        "check",
        "--name",
        "Ada",
        "--email",
        "ada@example.com",
        "--message-file",
        "/tmp/samabrains-test-nonexistent.txt",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("failed to read"), "{stderr}");
}

// ── Send command ─────────────────────────────────────────────────────

#[test]
fn test_send_invalid_input_never_connects() {
    // Nothing listens on the dead endpoint; a network attempt would surface
    // as "Network error", not the validation text.
    let (code, _, stderr) = run(&[
        "send",
        "--name",
        "",
        "--email",
        "ada@example.com",
        "--message",
        "hi",
    ]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Please fill in all fields"), "{stderr}");
    assert!(!stderr.contains("Network error"), "{stderr}");
}

#[test]
fn test_send_unreachable_server() {
    let (code, _, stderr) = run(&[
        "send",
        "--name",
        "Ada",
        "--email",
        "ada@example.com",
        "--message",
        "hi",
    ]);
    assert_eq!(code, 1);
    assert!(
        stderr.contains("Network error. Please check your connection and try again."),
        "{stderr}"
    );
}

#[test]
fn test_send_success() {
    let (endpoint, server) = respond_once(
        "200 OK",
        r#"{"success":true,"message":"Email sent successfully"}"#,
    );

    let (code, stdout, stderr) = run_against(
        &endpoint,
        &[
            "send",
            "--name",
            " Ada ",
            "--email",
            "ada@example.com",
            "--message",
            "Hello there\n",
        ],
    );

    assert_eq!(code, 0, "send should succeed: {stderr}");
    assert!(
        stdout.contains("Message sent successfully! I'll get back to you soon."),
        "{stdout}"
    );

    let request: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
    assert_eq!(request["name"], "Ada");
    assert_eq!(request["message"], "Hello there");
}

#[test]
fn test_send_shows_server_message() {
    let (endpoint, server) = respond_once(
        "429 Too Many Requests",
        r#"{"success":false,"message":"Too many contact requests. Please try again in 15 minutes."}"#,
    );

    let (code, _, stderr) = run_against(
        &endpoint,
        &["send", "--name", "Ada", "--email", "ada@example.com", "--message", "hi"],
    );
    server.join().unwrap();

    assert_eq!(code, 1);
    assert!(
        stderr.contains("Too many contact requests. Please try again in 15 minutes."),
        "{stderr}"
    );
}
