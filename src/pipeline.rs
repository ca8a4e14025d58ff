//! The scraping request pipeline
//!
//! # Stages
//!
//! 1. Validate the target URL
//! 2. Build the extraction request
//! 3. Run it through the orchestrator (one engine call)
//! 4. Normalize the payload into records
//! 5. Persist the artifact
//!
//! The first failing stage ends the run; no later stage is attempted and
//! nothing is written.

use crate::cli::Cli;
use crate::config::{load_config_with_hash, validate_engine_url, Config};
use crate::crawler::Orchestrator;
use crate::engine::{ExtractionEngine, SessionProvider, TokenUsage};
use crate::output::{normalize, render_artifact, should_echo, ArtifactWriter, ScrapedArtifact};
use crate::request::ExtractionRequest;
use crate::url::validate_url;
use crate::GleanError;
use std::path::PathBuf;

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub artifact: ScrapedArtifact,
    /// Where the artifact was written
    pub path: PathBuf,
    pub usage: Option<TokenUsage>,
}

/// Loads the optional config file and applies command-line overrides
///
/// Returns the config together with the hash of the file it came from, if
/// any.
pub fn resolve_config(cli: &Cli) -> Result<(Config, Option<String>), GleanError> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(engine_url) = &cli.engine_url {
        validate_engine_url(engine_url)?;
        config.engine.base_url = engine_url.clone();
    }

    Ok((config, hash))
}

/// Runs every stage for one invocation
///
/// # Arguments
///
/// * `cli` - Parsed command line
/// * `orchestrator` - Session provider and extraction engine
/// * `writer` - Artifact destination
///
/// # Returns
///
/// * `Ok(PipelineOutcome)` - The artifact was written
/// * `Err(GleanError)` - The error of the first failing stage
pub async fn run_pipeline<P, E>(
    cli: &Cli,
    orchestrator: &Orchestrator<P, E>,
    writer: &ArtifactWriter,
) -> Result<PipelineOutcome, GleanError>
where
    P: SessionProvider,
    E: ExtractionEngine,
{
    let url = validate_url(&cli.url)?;
    tracing::info!("Target: {}", url);

    let request = ExtractionRequest::build(cli.request_params())?;
    tracing::debug!(
        model = request.model(),
        format = %request.input_format(),
        chunk_size = request.chunk_token_threshold(),
        "Extraction request built"
    );

    let output = orchestrator.run(&request).await?;

    let artifact = normalize(&output.payload, &request)?;
    tracing::info!("Accepted {} record(s)", artifact.record_count());

    let path = writer.write(&artifact, cli.output.as_deref())?;

    Ok(PipelineOutcome {
        artifact,
        path,
        usage: output.usage,
    })
}

/// Renders the success report printed to stdout
pub fn render_outcome(outcome: &PipelineOutcome) -> Result<String, GleanError> {
    let mut report = format!(
        "✓ Extracted {} record(s) from {}\n✓ Results saved to {}",
        outcome.artifact.record_count(),
        outcome.artifact.url,
        outcome.path.display()
    );

    if should_echo(&outcome.artifact) {
        report.push_str("\n\nExtracted items:\n");
        report.push_str(&render_artifact(&outcome.artifact)?);
    }

    if let Some(usage) = &outcome.usage {
        report.push_str(&format!("\n\nToken usage: {}", usage));
    }

    Ok(report)
}

/// Prints the success report
pub fn present(outcome: &PipelineOutcome) -> Result<(), GleanError> {
    println!("{}", render_outcome(outcome)?);
    Ok(())
}
