//! Output module for validated extraction results
//!
//! This module handles:
//! - Validating the engine's raw payload against the record schema
//! - Wrapping validated records with request metadata
//! - Deriving artifact filenames and persisting artifacts as JSON

mod normalize;
mod writer;

pub use normalize::{normalize, ExtractedRecord, ScrapedArtifact};
pub use writer::{
    artifact_filename, instruction_fingerprint, render_artifact, should_echo, ArtifactWriter,
    ECHO_THRESHOLD,
};
