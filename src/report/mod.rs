//! Failure reporting
//!
//! Every failure of a run ends up here: it is logged with full detail (kind,
//! cause chain, stack) through the error log, summarized on stdout, and
//! mapped to a non-zero exit code.

pub mod logging;

pub use logging::{init, ErrorLogWriter, LogConfig};

use crate::cli::usage_reminder;
use crate::{ErrorKind, GleanError};
use std::backtrace::Backtrace;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Reports terminal failures
#[derive(Debug, Clone)]
pub struct FailureReporter {
    error_log: PathBuf,
}

impl FailureReporter {
    /// Creates a reporter without touching the global subscriber
    pub fn new(config: &LogConfig) -> Self {
        Self {
            error_log: config.error_log.clone(),
        }
    }

    /// Installs logging for `config` and returns a reporter bound to it
    ///
    /// # Returns
    ///
    /// * `Ok(FailureReporter)` - Logging installed
    /// * `Err(GleanError)` - A subscriber was already installed
    pub fn install(config: &LogConfig) -> Result<Self, GleanError> {
        logging::init(config)?;
        Ok(Self::new(config))
    }

    /// Returns the error log this reporter points users to
    pub fn error_log(&self) -> &Path {
        &self.error_log
    }

    /// Logs a failure, prints a short summary and returns the exit code
    pub fn report(&self, error: &GleanError) -> u8 {
        let kind = error.kind();
        tracing::error!(kind = %kind, "{}", log_entry(error));
        println!("{}", self.summary(error));
        kind.exit_code()
    }

    /// Short human-readable form of a failure for the terminal
    pub fn summary(&self, error: &GleanError) -> String {
        match error.kind() {
            ErrorKind::ArgumentParsing => {
                format!("✗ Invalid arguments: {}\n\n{}", error, usage_reminder())
            }
            _ => format!(
                "✗ {}\n\nDetails were written to {}",
                error,
                self.error_log.display()
            ),
        }
    }
}

/// Full diagnostic text of a failure
///
/// The cause chain is always included. A stack trace is attached for every
/// kind except argument parsing, where it carries no information.
pub fn log_entry(error: &GleanError) -> String {
    let mut entry = error.to_string();

    let mut source = error.source();
    while let Some(cause) = source {
        entry.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }

    if error.kind() != ErrorKind::ArgumentParsing {
        entry.push_str(&format!("\nstack:\n{}", Backtrace::force_capture()));
    }

    entry
}
