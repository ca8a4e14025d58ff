//! HTTP page renderer
//!
//! This module implements the default browser session on top of reqwest:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for `http://` and `https://` pages
//! - Local reads for `file://` URLs
//! - Inline HTML for `raw:` URLs
//! - Error classification

use crate::config::BrowserConfig;
use crate::engine::{BrowserSession, EngineError, RenderedPage, SessionProvider};
use crate::url::UrlScheme;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The renderer configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use glean::config::BrowserConfig;
/// use glean::engine::build_http_client;
///
/// let client = build_http_client(&BrowserConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &BrowserConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.page_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Opens [`HttpSession`]s
#[derive(Debug, Clone, Default)]
pub struct HttpSessionProvider {
    config: BrowserConfig,
}

impl HttpSessionProvider {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionProvider for HttpSessionProvider {
    type Session = HttpSession;

    async fn open(&self, headless: bool) -> Result<HttpSession, EngineError> {
        if !headless {
            tracing::warn!(
                "Headed rendering requested, but the HTTP renderer has no window; \
                 build with the `headless` feature for browser rendering"
            );
        }

        let client = build_http_client(&self.config)
            .map_err(|e| EngineError::Session(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!("Opened renderer session");
        Ok(HttpSession {
            client,
            pages_loaded: 0,
        })
    }
}

/// A renderer session backed by one HTTP client
///
/// Pages are always fetched fresh; nothing is cached between sessions.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    pages_loaded: u32,
}

impl BrowserSession for HttpSession {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, EngineError> {
        let page = match UrlScheme::detect(url) {
            Some(UrlScheme::Web) => fetch_url(&self.client, url).await?,
            Some(UrlScheme::File) => read_file_url(url).await?,
            Some(UrlScheme::Raw) => RenderedPage {
                url: url.to_string(),
                status_code: None,
                html: url["raw:".len()..].to_string(),
            },
            None => return Err(EngineError::UnsupportedUrl(url.to_string())),
        };

        self.pages_loaded += 1;
        tracing::debug!(
            "Rendered {} ({} bytes of HTML)",
            page.url,
            page.html.len()
        );
        Ok(page)
    }

    async fn close(self) -> Result<(), EngineError> {
        tracing::debug!(
            "Closing renderer session after {} page(s)",
            self.pages_loaded
        );
        Ok(())
    }
}

/// Fetches a remote page
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | page body |
/// | other status | `EngineError::Status` |
/// | timeout | `EngineError::Timeout` |
/// | any other transport error | `EngineError::Http` |
async fn fetch_url(client: &Client, url: &str) -> Result<RenderedPage, EngineError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(EngineError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response
        .text()
        .await
        .map_err(|e| classify_error(url, e))?;

    Ok(RenderedPage {
        url: final_url,
        status_code: Some(status.as_u16()),
        html,
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Timeout {
            url: url.to_string(),
        }
    } else {
        EngineError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Reads a `file://` URL from disk
async fn read_file_url(url: &str) -> Result<RenderedPage, EngineError> {
    let path = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.to_file_path().ok())
        .ok_or_else(|| EngineError::UnsupportedUrl(url.to_string()))?;

    let html = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| EngineError::File {
            path: path.clone(),
            source,
        })?;

    Ok(RenderedPage {
        url: url.to_string(),
        status_code: None,
        html,
    })
}
