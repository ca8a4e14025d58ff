//! Glean main entry point
//!
//! This is the command-line interface for Glean, the LLM-assisted page
//! scraper.

use glean::cli::{parse_args, Cli, Invocation};
use glean::config::Config;
use glean::crawler::default_orchestrator;
use glean::output::ArtifactWriter;
use glean::pipeline::{present, resolve_config, run_pipeline};
use glean::report::{FailureReporter, LogConfig};
use glean::GleanError;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Info(info)) => {
            // --help / --version
            let _ = info.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => return fail(&setup_reporting(&LogConfig::default()), &e),
    };

    // Load configuration before logging so the error log location is known
    let (config, config_hash) = match resolve_config(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            let log_config = LogConfig {
                verbose: cli.verbose,
                quiet: cli.quiet,
                ..LogConfig::default()
            };
            return fail(&setup_reporting(&log_config), &e);
        }
    };

    let reporter = setup_reporting(&LogConfig::new(
        config.logging.error_log.clone(),
        cli.verbose,
        cli.quiet,
    ));

    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }

    match handle_run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&reporter, &e),
    }
}

/// Installs logging and returns the reporter for terminal failures
fn setup_reporting(config: &LogConfig) -> FailureReporter {
    FailureReporter::install(config).unwrap_or_else(|e| {
        eprintln!("warning: logging unavailable: {}", e);
        FailureReporter::new(config)
    })
}

fn fail(reporter: &FailureReporter, error: &GleanError) -> ExitCode {
    ExitCode::from(reporter.report(error))
}

/// Handles a full extraction run
async fn handle_run(cli: &Cli, config: &Config) -> Result<(), GleanError> {
    let orchestrator =
        default_orchestrator(config).map_err(|e| GleanError::Extraction(e.to_string()))?;

    let outcome = run_pipeline(cli, &orchestrator, &ArtifactWriter::default()).await?;
    present(&outcome)?;

    tracing::info!("Run completed successfully");
    Ok(())
}
