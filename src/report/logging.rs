//! Logging setup
//!
//! Two layers share one subscriber: a console layer whose verbosity follows
//! `-v`/`--quiet`, and an append-only error log that only receives
//! `ERROR` events.

use crate::config::LoggingConfig;
use crate::GleanError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Process-wide logging configuration
///
/// Built once at start-up and handed to [`init`] and to the failure
/// reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Append-only error log
    pub error_log: PathBuf,
    /// Console verbosity (`-v` count)
    pub verbose: u8,
    /// Only errors on the console
    pub quiet: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(LoggingConfig::default().error_log, 0, false)
    }
}

impl LogConfig {
    pub fn new(error_log: impl Into<PathBuf>, verbose: u8, quiet: bool) -> Self {
        Self {
            error_log: error_log.into(),
            verbose,
            quiet,
        }
    }

    /// Returns the console filter for this verbosity
    pub fn console_filter(&self) -> EnvFilter {
        if self.quiet {
            return EnvFilter::new("error");
        }

        match self.verbose {
            0 => EnvFilter::new("glean=info,warn"),
            1 => EnvFilter::new("glean=debug,info"),
            2 => EnvFilter::new("glean=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

/// Installs the global subscriber
///
/// Can succeed only once per process; later calls return an error and leave
/// the installed subscriber in place.
pub fn init(config: &LogConfig) -> Result<(), GleanError> {
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(config.console_filter());

    let error_log = fmt::layer()
        .with_writer(ErrorLogWriter::new(&config.error_log))
        .with_ansi(false)
        .with_target(true)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(console)
        .with(error_log)
        .try_init()
        .map_err(|e| {
            GleanError::io(
                &config.error_log,
                io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()),
            )
        })
}

/// Opens the error log in append mode for every event
///
/// Nothing is created on disk until the first error is written.
#[derive(Debug, Clone)]
pub struct ErrorLogWriter {
    path: PathBuf,
}

impl ErrorLogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl<'a> MakeWriter<'a> for ErrorLogWriter {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match self.open() {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!(
                    "warning: cannot write error log {}: {}",
                    self.path.display(),
                    e
                );
                Box::new(io::sink())
            }
        }
    }
}
