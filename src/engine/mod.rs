//! Page rendering and LLM extraction engine
//!
//! The crawl orchestrator only depends on the two capability traits defined
//! here, [`SessionProvider`] and [`ExtractionEngine`], so the pipeline can run
//! against stubs in tests. The default implementation is made of:
//! - An HTTP page renderer (`fetcher`), or a Chromium renderer (`chrome`)
//!   when built with the `headless` feature
//! - Content conversion to the requested input format (`content`)
//! - Token-bounded chunking with overlap (`chunker`)
//! - An Ollama-compatible chat client (`llm`)
//! - The extraction loop tying them together (`extractor`)

#[cfg(feature = "headless")]
mod chrome;
mod chunker;
mod content;
mod extractor;
mod fetcher;
mod llm;

#[cfg(feature = "headless")]
pub use chrome::{browser_args, ChromeSession, ChromeSessionProvider};
pub use chunker::chunk_content;
pub use content::{extract_text, prepare_content};
pub use extractor::{parse_model_output, record_schema, LlmExtractionEngine};
pub use fetcher::{build_http_client, HttpSession, HttpSessionProvider};
pub use llm::{Completion, OllamaClient};

use crate::request::ExtractionRequest;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the rendering or extraction engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("LLM runtime returned HTTP {status}: {body}")]
    Runtime { status: u16, body: String },

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Session error: {0}")]
    Session(String),
}

/// A page as loaded by a browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code, when the page came over the network
    pub status_code: Option<u16>,
    /// Page HTML
    pub html: String,
}

/// Token accounting reported by the LLM runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Number of inference requests made
    pub requests: u32,
    /// Tokens consumed by prompts
    pub prompt_tokens: u64,
    /// Tokens produced by the model
    pub completion_tokens: u64,
}

impl TokenUsage {
    /// Returns prompt plus completion tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.requests += other.requests;
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} request(s), {} prompt + {} completion = {} tokens",
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens()
        )
    }
}

/// Result of one fetch-and-extract call
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Extracted records as a JSON array, not yet validated
    pub payload: String,
    /// Token usage, if the engine tracks it
    pub usage: Option<TokenUsage>,
}

/// Opens browser sessions
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    type Session: BrowserSession;

    /// Acquires a session; the caller must hand it back through
    /// [`BrowserSession::close`]
    async fn open(&self, headless: bool) -> Result<Self::Session, EngineError>;
}

/// A live browser session able to load pages
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Loads a page and returns its HTML
    async fn render(&mut self, url: &str) -> Result<RenderedPage, EngineError>;

    /// Releases the session
    async fn close(self) -> Result<(), EngineError>;

    /// Best-effort synchronous release for a session dropped without
    /// [`close`](BrowserSession::close), e.g. on panic or cancellation
    fn abort(&mut self) {}
}

/// Fetches a page through a session and extracts records from it
#[allow(async_fn_in_trait)]
pub trait ExtractionEngine {
    async fn fetch_and_extract<S: BrowserSession>(
        &self,
        session: &mut S,
        request: &ExtractionRequest,
    ) -> Result<EngineOutput, EngineError>;
}
