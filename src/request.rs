//! Extraction request construction
//!
//! Maps validated command-line parameters onto the immutable
//! [`ExtractionRequest`] handed to the extraction engine.

use crate::GleanError;
use clap::ValueEnum;
use std::fmt;

/// Model used when `--model` is not given
pub const DEFAULT_MODEL: &str = "ollama/deepseek-r1:latest";

/// How page content is presented to the LLM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum InputFormat {
    /// HTML converted to Markdown
    #[default]
    StructuredMarkdown,
    /// The page HTML as fetched
    RawHtml,
    /// Visible text only
    PlainText,
}

impl InputFormat {
    /// Returns the command-line spelling of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredMarkdown => "structured-markdown",
            Self::RawHtml => "raw-html",
            Self::PlainText => "plain-text",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw request parameters, before range checks
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub url: String,
    pub instruction: String,
    pub model: String,
    pub temperature: f64,
    pub chunk_token_threshold: u32,
    pub overlap_rate: f64,
    pub max_tokens: u32,
    pub input_format: InputFormat,
    pub headless: bool,
}

/// A fully checked extraction request
///
/// Built once per invocation by [`ExtractionRequest::build`] and never
/// mutated afterwards; fields are only readable.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    url: String,
    instruction: String,
    model: String,
    temperature: f64,
    chunk_token_threshold: u32,
    overlap_rate: f64,
    max_tokens: u32,
    input_format: InputFormat,
    headless: bool,
}

impl ExtractionRequest {
    /// Builds a request from already URL-validated parameters
    ///
    /// # Constraints
    ///
    /// | Parameter | Rule |
    /// |-----------|------|
    /// | temperature | within `[0.0, 1.0]` |
    /// | overlap rate | within `[0.0, 1.0]` |
    /// | chunk size | `> 0` |
    /// | max tokens | `> 0` |
    /// | instruction | not blank |
    /// | model | not blank |
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionRequest)` - All parameters in range
    /// * `Err(GleanError::InvalidParameter)` - The first offending parameter
    pub fn build(params: RequestParams) -> Result<Self, GleanError> {
        check_unit_interval("temp", params.temperature)?;
        check_unit_interval("overlap", params.overlap_rate)?;
        check_positive("chunk-size", params.chunk_token_threshold)?;
        check_positive("max-tokens", params.max_tokens)?;
        check_not_blank("instruction", &params.instruction)?;
        check_not_blank("model", &params.model)?;

        Ok(Self {
            url: params.url,
            instruction: params.instruction,
            model: params.model,
            temperature: params.temperature,
            chunk_token_threshold: params.chunk_token_threshold,
            overlap_rate: params.overlap_rate,
            max_tokens: params.max_tokens,
            input_format: params.input_format,
            headless: params.headless,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn chunk_token_threshold(&self) -> u32 {
        self.chunk_token_threshold
    }

    pub fn overlap_rate(&self) -> f64 {
        self.overlap_rate
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn input_format(&self) -> InputFormat {
        self.input_format
    }

    pub fn headless(&self) -> bool {
        self.headless
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), GleanError> {
    // NaN fails the range check too
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GleanError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        })
    }
}

fn check_positive(name: &'static str, value: u32) -> Result<(), GleanError> {
    if value > 0 {
        Ok(())
    } else {
        Err(GleanError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        })
    }
}

fn check_not_blank(name: &'static str, value: &str) -> Result<(), GleanError> {
    if value.trim().is_empty() {
        Err(GleanError::InvalidParameter {
            name,
            value: format!("{:?}", value),
            reason: "cannot be empty".to_string(),
        })
    } else {
        Ok(())
    }
}
