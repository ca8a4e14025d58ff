//! Glean: structured record extraction from rendered web pages
//!
//! This crate validates a target URL, renders the page, asks a locally hosted
//! LLM to extract `{title, date}` records according to a free-text instruction,
//! and persists the validated result as a JSON artifact.

pub mod cli;
pub mod config;
pub mod crawler;
pub mod engine;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod request;
pub mod url;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Glean operations
#[derive(Debug, Error)]
pub enum GleanError {
    #[error("{0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Invalid value for --{name}: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Extracted data violates the record schema{}: {reason}", fmt_index(.index))]
    SchemaViolation { index: Option<usize>, reason: String },

    #[error("IO error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    ArgumentParsing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn fmt_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" (record {})", i),
        None => String::new(),
    }
}

/// Coarse classification of a [`GleanError`], used for reporting and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    InvalidParameter,
    ExtractionFailure,
    SchemaViolation,
    IoFailure,
    ArgumentParsing,
    Config,
}

impl ErrorKind {
    /// Returns the name used in log entries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::InvalidParameter => "invalid_parameter",
            Self::ExtractionFailure => "extraction_failure",
            Self::SchemaViolation => "schema_violation",
            Self::IoFailure => "io_failure",
            Self::ArgumentParsing => "argument_parsing",
            Self::Config => "config",
        }
    }

    /// Process exit code for this kind of failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ArgumentParsing => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GleanError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::Extraction(_) => ErrorKind::ExtractionFailure,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::ArgumentParsing(_) => ErrorKind::ArgumentParsing,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL validation errors
///
/// The `Display` output of each variant is the full user-facing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("{}", crate::url::validate::duplicate_protocol_message(.url, .suggestion))]
    DuplicateProtocol { url: String, suggestion: String },

    #[error("{}", crate::url::validate::missing_protocol_message(.url))]
    MissingProtocol { url: String },
}

/// Result type alias for Glean operations
pub type Result<T> = std::result::Result<T, GleanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::EngineConfig;
pub use output::{ExtractedRecord, ScrapedArtifact};
pub use request::{ExtractionRequest, InputFormat};
pub use crate::url::validate_url;
