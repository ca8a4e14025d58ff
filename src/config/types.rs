use serde::Deserialize;
use std::path::PathBuf;

/// Default LLM runtime endpoint (a local Ollama server)
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:11434";

/// Default location of the append-only error log
pub const DEFAULT_ERROR_LOG: &str = "logs/glean_errors.log";

/// Main configuration structure for Glean
///
/// Every section is optional; a missing file or section means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// LLM runtime connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the Ollama-compatible runtime
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Bearer token sent with every request, if set
    #[serde(rename = "api-token")]
    pub api_token: Option<String>,

    /// Upper bound for a single inference request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            api_token: None,
            request_timeout_secs: 300,
        }
    }
}

/// Page renderer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// User-Agent header sent when loading pages
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Upper bound for loading a single page (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("glean/{}", env!("CARGO_PKG_VERSION")),
            page_timeout_secs: 30,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path of the error log, relative to the working directory
    #[serde(rename = "error-log")]
    pub error_log: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
        }
    }
}
