//! Crawl orchestrator - scoped session around one extraction
//!
//! # Flow
//!
//! 1. Open a browser session with the request's headless flag
//! 2. Submit exactly one fetch-and-extract call
//! 3. Close the session, whatever the outcome of step 2
//! 4. Forward token usage to the log
//!
//! There is no retry: any engine failure is terminal for the call. If the
//! run is cancelled or the engine panics, [`SessionGuard`] still releases
//! the session when it is dropped.

use crate::engine::{BrowserSession, EngineError, EngineOutput, ExtractionEngine, SessionProvider};
use crate::request::ExtractionRequest;
use crate::GleanError;
use std::time::Instant;

/// Runs extraction requests against a session provider and an engine
pub struct Orchestrator<P, E> {
    provider: P,
    engine: E,
}

impl<P, E> Orchestrator<P, E>
where
    P: SessionProvider,
    E: ExtractionEngine,
{
    /// Creates a new orchestrator
    pub fn new(provider: P, engine: E) -> Self {
        Self { provider, engine }
    }

    /// Executes one fetch-and-extract call
    ///
    /// # Returns
    ///
    /// * `Ok(EngineOutput)` - The raw extraction payload and usage
    /// * `Err(GleanError::Extraction)` - Session or engine failure
    pub async fn run(&self, request: &ExtractionRequest) -> Result<EngineOutput, GleanError> {
        let started = Instant::now();
        tracing::info!(
            "Opening {} session for {}",
            if request.headless() { "headless" } else { "headed" },
            request.url()
        );

        let session = self
            .provider
            .open(request.headless())
            .await
            .map_err(|e| GleanError::Extraction(e.to_string()))?;
        let mut guard = SessionGuard::new(session);

        let outcome = match guard.session_mut() {
            Ok(session) => self.engine.fetch_and_extract(session, request).await,
            Err(e) => Err(e),
        };

        if let Err(e) = guard.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        let output = outcome.map_err(|e| GleanError::Extraction(e.to_string()))?;

        tracing::info!("Extraction finished in {:?}", started.elapsed());
        if let Some(usage) = &output.usage {
            tracing::info!("Token usage: {}", usage);
        }

        Ok(output)
    }
}

/// Owns an open session until it is closed
///
/// [`close`](SessionGuard::close) is the normal path. Dropping the guard
/// without closing it calls [`BrowserSession::abort`] instead.
pub struct SessionGuard<S: BrowserSession> {
    session: Option<S>,
}

impl<S: BrowserSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Returns the open session
    pub fn session_mut(&mut self) -> Result<&mut S, EngineError> {
        self.session
            .as_mut()
            .ok_or_else(|| EngineError::Session("session already closed".to_string()))
    }

    /// Closes the session and waits for it to shut down
    pub async fn close(mut self) -> Result<(), EngineError> {
        match self.session.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            tracing::warn!("Browser session dropped without close; releasing it");
            session.abort();
        }
    }
}
