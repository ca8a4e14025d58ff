//! Integration tests for the scraping request pipeline
//!
//! Most tests drive the pipeline with a stub engine; the last one runs the
//! default HTTP renderer and LLM engine against a wiremock server.

use glean::cli::{parse_args, Cli, Invocation};
use glean::crawler::{default_orchestrator, Orchestrator};
use glean::engine::{
    BrowserSession, EngineError, EngineOutput, ExtractionEngine, RenderedPage, SessionProvider,
};
use glean::output::ArtifactWriter;
use glean::pipeline::{resolve_config, run_pipeline};
use glean::{ErrorKind, ExtractionRequest, ScrapedArtifact};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAMPLE_PAYLOAD: &str = r#"[{"title": "Sample Blog Post", "date": "2025-01-01"}]"#;

struct NullProvider;

struct NullSession;

impl SessionProvider for NullProvider {
    type Session = NullSession;

    async fn open(&self, _headless: bool) -> Result<NullSession, EngineError> {
        Ok(NullSession)
    }
}

impl BrowserSession for NullSession {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, EngineError> {
        Ok(RenderedPage {
            url: url.to_string(),
            status_code: Some(200),
            html: String::new(),
        })
    }

    async fn close(self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Returns a canned payload or failure and counts calls
struct CannedEngine {
    result: Result<&'static str, &'static str>,
    calls: Arc<AtomicU32>,
}

impl ExtractionEngine for CannedEngine {
    async fn fetch_and_extract<S: BrowserSession>(
        &self,
        _session: &mut S,
        _request: &ExtractionRequest,
    ) -> Result<EngineOutput, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.result {
            Ok(payload) => Ok(EngineOutput {
                payload: payload.to_string(),
                usage: None,
            }),
            Err(message) => Err(EngineError::Session(message.to_string())),
        }
    }
}

fn create_orchestrator(
    result: Result<&'static str, &'static str>,
) -> (Orchestrator<NullProvider, CannedEngine>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let orchestrator = Orchestrator::new(
        NullProvider,
        CannedEngine {
            result,
            calls: Arc::clone(&calls),
        },
    );
    (orchestrator, calls)
}

fn create_cli(url: &str, extra: &[&str]) -> Cli {
    let mut args = vec![
        "glean",
        "--url",
        url,
        "--instruction",
        "Extract blog posts with title and date",
        "--temp",
        "0.0",
    ];
    args.extend_from_slice(extra);

    match parse_args(args).expect("arguments should parse") {
        Invocation::Run(cli) => cli,
        Invocation::Info(info) => panic!("unexpected info request: {}", info),
    }
}

fn json_files(dir: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect()
}

#[tokio::test]
async fn test_successful_run_writes_artifact() {
    let dir = TempDir::new().unwrap();
    let (orchestrator, calls) = create_orchestrator(Ok(SAMPLE_PAYLOAD));
    let cli = create_cli("https://example.com", &[]);

    let outcome = run_pipeline(&cli, &orchestrator, &ArtifactWriter::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(json_files(dir.path()), vec![outcome.path.clone()]);

    let file_name = outcome.path.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("example_com_"));

    let written: ScrapedArtifact =
        serde_json::from_str(&fs::read_to_string(&outcome.path).unwrap()).unwrap();
    assert_eq!(written.url, "https://example.com");
    assert_eq!(written.instruction, "Extract blog posts with title and date");
    assert_eq!(written.results.len(), 1);
    assert_eq!(written.results[0].title, "Sample Blog Post");
    assert_eq!(written.results[0].date.as_deref(), Some("2025-01-01"));
}

#[tokio::test]
async fn test_output_flag_is_honored() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("runs/latest.json");
    let (orchestrator, _) = create_orchestrator(Ok(SAMPLE_PAYLOAD));
    let cli = create_cli(
        "https://example.com",
        &["--output", target.to_str().unwrap()],
    );

    let outcome = run_pipeline(&cli, &orchestrator, &ArtifactWriter::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(outcome.path, target);
    assert!(target.exists());
    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_invalid_url_stops_before_engine() {
    let dir = TempDir::new().unwrap();

    for url in ["example.com", "https://https://example.com"] {
        let (orchestrator, calls) = create_orchestrator(Ok(SAMPLE_PAYLOAD));
        let err = run_pipeline(
            &create_cli(url, &[]),
            &orchestrator,
            &ArtifactWriter::new(dir.path()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_duplicate_protocol_suggests_fix() {
    let (orchestrator, _) = create_orchestrator(Ok(SAMPLE_PAYLOAD));
    let err = run_pipeline(
        &create_cli("https://https://example.com", &[]),
        &orchestrator,
        &ArtifactWriter::default(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("https://example.com"));
}

#[tokio::test]
async fn test_out_of_range_parameter_stops_before_engine() {
    let dir = TempDir::new().unwrap();
    let (orchestrator, calls) = create_orchestrator(Ok(SAMPLE_PAYLOAD));
    let mut cli = create_cli("https://example.com", &[]);
    cli.temperature = 1.5;

    let err = run_pipeline(&cli, &orchestrator, &ArtifactWriter::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_engine_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (orchestrator, calls) = create_orchestrator(Err("timeout"));

    let err = run_pipeline(
        &create_cli("https://example.com", &[]),
        &orchestrator,
        &ArtifactWriter::new(dir.path()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExtractionFailure);
    assert!(err.to_string().contains("timeout"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_schema_violation_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (orchestrator, _) =
        create_orchestrator(Ok(r#"[{"title": "Good"}, {"title": ""}]"#));

    let err = run_pipeline(
        &create_cli("https://example.com", &[]),
        &orchestrator,
        &ArtifactWriter::new(dir.path()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    assert!(json_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_default_engine_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><article><h2>Sample Blog Post</h2><time>2025-01-01</time></article></body></html>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": SAMPLE_PAYLOAD },
            "done": true,
            "prompt_eval_count": 42,
            "eval_count": 12
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/blog", mock_server.uri());
    let cli = create_cli(&url, &["--engine-url", &mock_server.uri()]);

    let (config, _) = resolve_config(&cli).unwrap();
    let orchestrator = default_orchestrator(&config).unwrap();

    let outcome = run_pipeline(&cli, &orchestrator, &ArtifactWriter::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(outcome.artifact.url, url);
    assert_eq!(outcome.artifact.results[0].title, "Sample Blog Post");

    let usage = outcome.usage.unwrap();
    assert_eq!(usage.requests, 1);
    assert_eq!(usage.total_tokens(), 54);
}
