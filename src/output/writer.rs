//! Artifact persistence
//!
//! Artifacts are written as pretty-printed JSON to
//! `{sanitized-url}_{instruction-fingerprint}_{YYYYMMDD_HHMMSS}.json`.

use crate::output::normalize::ScrapedArtifact;
use crate::url::sanitize_url;
use crate::GleanError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Artifacts with fewer records than this are also echoed to stdout
pub const ECHO_THRESHOLD: usize = 5;

/// Number of hex characters kept from the instruction hash
const FINGERPRINT_LEN: usize = 6;

/// Returns a short, stable fingerprint of an instruction
///
/// The first six hex characters of its SHA-256 digest. Different
/// instructions may collide; the timestamp and URL usually still tell
/// artifacts apart.
pub fn instruction_fingerprint(instruction: &str) -> String {
    let digest = Sha256::digest(instruction.as_bytes());
    let mut fingerprint = hex::encode(digest);
    fingerprint.truncate(FINGERPRINT_LEN);
    fingerprint
}

/// Derives the artifact filename for a URL, instruction and timestamp
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use glean::output::artifact_filename;
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
/// let name = artifact_filename("https://example.com/blog", "Extract posts", &ts);
/// assert!(name.starts_with("example_com_blog_"));
/// assert!(name.ends_with("_20250102_030405.json"));
/// ```
pub fn artifact_filename(url: &str, instruction: &str, timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.json",
        sanitize_url(url),
        instruction_fingerprint(instruction),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Serializes an artifact as indented JSON
pub fn render_artifact(artifact: &ScrapedArtifact) -> Result<String, GleanError> {
    serde_json::to_string_pretty(artifact).map_err(|e| GleanError::io("<artifact>", e.into()))
}

/// Returns true if the artifact is small enough to echo to stdout
pub fn should_echo(artifact: &ScrapedArtifact) -> bool {
    artifact.record_count() < ECHO_THRESHOLD
}

/// Writes artifacts to a directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    directory: PathBuf,
}

impl Default for ArtifactWriter {
    /// Writes into the current working directory
    fn default() -> Self {
        Self::new(".")
    }
}

impl ArtifactWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Returns the path an artifact would be written to
    ///
    /// An explicit `output` path wins over the derived filename.
    pub fn target_path(&self, artifact: &ScrapedArtifact, output: Option<&Path>) -> PathBuf {
        match output {
            Some(path) => path.to_path_buf(),
            None => self.directory.join(artifact_filename(
                &artifact.url,
                &artifact.instruction,
                &artifact.timestamp,
            )),
        }
    }

    /// Persists an artifact and returns where it was written
    ///
    /// # Arguments
    ///
    /// * `artifact` - The normalized result
    /// * `output` - Explicit destination from `--output`, if any
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(GleanError::Io)` - The file could not be written
    pub fn write(
        &self,
        artifact: &ScrapedArtifact,
        output: Option<&Path>,
    ) -> Result<PathBuf, GleanError> {
        let path = self.target_path(artifact, output);
        let mut json = render_artifact(artifact)?;
        json.push('\n');

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GleanError::io(parent, e))?;
        }
        fs::write(&path, json).map_err(|e| GleanError::io(&path, e))?;

        tracing::info!(
            "Wrote {} record(s) to {}",
            artifact.record_count(),
            path.display()
        );
        Ok(path)
    }
}
