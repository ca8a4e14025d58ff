//! Crawl orchestration
//!
//! This module owns the single fetch-and-extract call of a run: it acquires
//! a browser session, hands it to the extraction engine exactly once, and
//! always releases the session afterwards.

mod orchestrator;

pub use orchestrator::{Orchestrator, SessionGuard};

use crate::config::Config;
#[cfg(feature = "headless")]
use crate::engine::ChromeSessionProvider;
#[cfg(not(feature = "headless"))]
use crate::engine::HttpSessionProvider;
use crate::engine::{EngineError, LlmExtractionEngine};

/// The orchestrator wired to the Chromium renderer and LLM engine
#[cfg(feature = "headless")]
pub type DefaultOrchestrator = Orchestrator<ChromeSessionProvider, LlmExtractionEngine>;

/// The orchestrator wired to the HTTP renderer and LLM engine
#[cfg(not(feature = "headless"))]
pub type DefaultOrchestrator = Orchestrator<HttpSessionProvider, LlmExtractionEngine>;

/// Builds the default orchestrator from configuration
///
/// Pages are rendered in Chromium when the crate is built with the
/// `headless` feature, and fetched over plain HTTP otherwise.
///
/// # Arguments
///
/// * `config` - Renderer and LLM runtime settings
///
/// # Returns
///
/// * `Ok(DefaultOrchestrator)` - Ready to run one request
/// * `Err(EngineError)` - The LLM client could not be built
pub fn default_orchestrator(config: &Config) -> Result<DefaultOrchestrator, EngineError> {
    Ok(Orchestrator::new(
        default_provider(config),
        LlmExtractionEngine::new(&config.engine)?,
    ))
}

#[cfg(feature = "headless")]
fn default_provider(config: &Config) -> ChromeSessionProvider {
    ChromeSessionProvider::new(config.browser.clone())
}

#[cfg(not(feature = "headless"))]
fn default_provider(config: &Config) -> HttpSessionProvider {
    HttpSessionProvider::new(config.browser.clone())
}
