//! Integration tests for the `glean` binary
//!
//! Each test runs the binary in a scratch directory with the page and the
//! LLM runtime served by wiremock.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "<html><body><article><h2>Sample Blog Post</h2><time>2025-01-01</time></article></body></html>";

async fn run_glean(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_glean"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("failed to run glean")
}

async fn serve_page(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(mock_server)
        .await;
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[tokio::test]
async fn test_successful_run() {
    let mock_server = MockServer::start().await;
    serve_page(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "role": "assistant",
                "content": "[{\"title\": \"Sample Blog Post\", \"date\": \"2025-01-01\"}]"
            },
            "done": true,
            "prompt_eval_count": 30,
            "eval_count": 10
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/blog", mock_server.uri());
    let output = run_glean(
        dir.path(),
        &[
            "--url",
            &url,
            "--instruction",
            "Extract blog posts with title and date",
            "--temp",
            "0.0",
            "--engine-url",
            &mock_server.uri(),
        ],
    )
    .await;

    assert!(output.status.success(), "stdout: {}", stdout(&output));

    let files = json_files(dir.path());
    assert_eq!(files.len(), 1);

    let artifact: Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(artifact["url"], url.as_str());
    assert_eq!(
        artifact["results"],
        json!([{"title": "Sample Blog Post", "date": "2025-01-01"}])
    );

    let printed = stdout(&output);
    assert!(printed.contains("✓ Results saved to"));
    assert!(printed.contains("Extracted items:"));

    // Nothing failed, so no error log
    assert!(!dir.path().join("logs/glean_errors.log").exists());
}

#[tokio::test]
async fn test_engine_failure_is_logged_once() {
    let mock_server = MockServer::start().await;
    serve_page(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("timeout"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/blog", mock_server.uri());
    let output = run_glean(
        dir.path(),
        &[
            "--url",
            &url,
            "--instruction",
            "Extract blog posts",
            "--temp",
            "0",
            "--engine-url",
            &mock_server.uri(),
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(json_files(dir.path()).is_empty());
    assert!(stdout(&output).contains("✗ Extraction failed"));

    let log = fs::read_to_string(dir.path().join("logs/glean_errors.log")).unwrap();
    assert_eq!(log.lines().filter(|line| line.contains(" ERROR ")).count(), 1);
    assert!(log.contains("timeout"));
    assert!(log.contains("extraction_failure"));
}

#[tokio::test]
async fn test_missing_url_shows_examples() {
    let dir = TempDir::new().unwrap();
    let output = run_glean(dir.path(), &["--instruction", "Extract posts", "--temp", "0"]).await;

    assert_eq!(output.status.code(), Some(2));

    let printed = stdout(&output);
    assert!(printed.contains("--url"));
    assert!(printed.contains("Examples:"));
    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_rendering() {
    let dir = TempDir::new().unwrap();
    let output = run_glean(
        dir.path(),
        &[
            "--url",
            "example.com",
            "--instruction",
            "Extract posts",
            "--temp",
            "0",
            // Nothing listens here; the run must stop before contacting it
            "--engine-url",
            "http://127.0.0.1:9",
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));

    let printed = stdout(&output);
    assert!(printed.contains("URL is missing a protocol: example.com"));
    assert!(printed.contains("✓ https://example.com"));
    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_help_exits_successfully() {
    let dir = TempDir::new().unwrap();
    let output = run_glean(dir.path(), &["--help"]).await;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Examples:"));
}
