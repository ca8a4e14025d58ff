//! Chromium page renderer
//!
//! Loads pages in a real browser over the DevTools protocol, so content built
//! by page scripts is part of the HTML handed to the extraction engine.
//! Compiled with the `headless` feature.
//!
//! The session owns the browser process. [`BrowserSession::close`] shuts it
//! down and waits for it; a session dropped without `close` hands the
//! shutdown to a background task on the current runtime.

use crate::config::BrowserConfig;
use crate::engine::{BrowserSession, EngineError, RenderedPage, SessionProvider};
use crate::url::UrlScheme;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Extra command-line switches passed to Chromium
pub fn browser_args(config: &BrowserConfig) -> Vec<String> {
    vec![
        format!("--user-agent={}", config.user_agent),
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--no-first-run".to_string(),
    ]
}

/// Builds the launch configuration; `headless = false` opens a window
fn launch_config(config: &BrowserConfig, headless: bool) -> Result<LaunchConfig, EngineError> {
    let mut builder = LaunchConfig::builder()
        .no_sandbox()
        .request_timeout(Duration::from_secs(config.page_timeout_secs))
        .args(browser_args(config));

    if !headless {
        builder = builder.with_head();
    }

    builder
        .build()
        .map_err(|e| EngineError::Session(format!("Invalid browser configuration: {}", e)))
}

/// Opens [`ChromeSession`]s, one browser process each
#[derive(Debug, Clone, Default)]
pub struct ChromeSessionProvider {
    config: BrowserConfig,
}

impl ChromeSessionProvider {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionProvider for ChromeSessionProvider {
    type Session = ChromeSession;

    async fn open(&self, headless: bool) -> Result<ChromeSession, EngineError> {
        let launch = launch_config(&self.config, headless)?;

        let (browser, mut handler) = Browser::launch(launch)
            .await
            .map_err(|e| EngineError::Session(format!("Failed to launch browser: {}", e)))?;

        // The handler must be polled for any DevTools command to complete
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        tracing::debug!(
            "Launched {} browser",
            if headless { "headless" } else { "headed" }
        );

        Ok(ChromeSession {
            browser: Some(browser),
            handler: Some(handler),
            runtime: Handle::current(),
            page_timeout: Duration::from_secs(self.config.page_timeout_secs),
            pages_loaded: 0,
        })
    }
}

/// A live browser process
pub struct ChromeSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    runtime: Handle,
    page_timeout: Duration,
    pages_loaded: u32,
}

impl BrowserSession for ChromeSession {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, EngineError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| EngineError::Session("browser already closed".to_string()))?;

        let target = match UrlScheme::detect(url) {
            Some(UrlScheme::Web) | Some(UrlScheme::File) => url,
            Some(UrlScheme::Raw) => "about:blank",
            None => return Err(EngineError::UnsupportedUrl(url.to_string())),
        };

        let page = browser
            .new_page(target)
            .await
            .map_err(|e| EngineError::Session(format!("Failed to open {}: {}", url, e)))?;

        let loaded = tokio::time::timeout(self.page_timeout, load_page(&page, url)).await;

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close page for {}: {}", url, e);
        }

        let page = loaded.map_err(|_| EngineError::Timeout {
            url: url.to_string(),
        })??;

        self.pages_loaded += 1;
        tracing::debug!(
            "Rendered {} in browser ({} bytes of HTML)",
            page.url,
            page.html.len()
        );
        Ok(page)
    }

    async fn close(mut self) -> Result<(), EngineError> {
        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser.close().await;
                if let Err(e) = browser.wait().await {
                    tracing::warn!("Failed to wait for browser exit: {}", e);
                }
                closed
                    .map(|_| ())
                    .map_err(|e| EngineError::Session(format!("Failed to close browser: {}", e)))
            }
            None => Ok(()),
        };

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        tracing::debug!(
            "Closed browser session after {} page(s)",
            self.pages_loaded
        );
        result
    }

    fn abort(&mut self) {
        let browser = self.browser.take();
        let handler = self.handler.take();
        if browser.is_none() && handler.is_none() {
            return;
        }

        self.runtime.spawn(async move {
            if let Some(mut browser) = browser {
                if let Err(e) = browser.close().await {
                    tracing::warn!("Browser cleanup after drop failed: {}", e);
                }
                let _ = browser.wait().await;
            }
            if let Some(handler) = handler {
                handler.abort();
            }
        });
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Waits for the page to settle and reads its live DOM
async fn load_page(page: &Page, url: &str) -> Result<RenderedPage, EngineError> {
    let render_error = |e: chromiumoxide::error::CdpError| {
        EngineError::Session(format!("Failed to render {}: {}", url, e))
    };

    match url.strip_prefix("raw:") {
        Some(html) => {
            page.set_content(html).await.map_err(render_error)?;
        }
        None => {
            page.wait_for_navigation().await.map_err(render_error)?;
        }
    }

    let html = page.content().await.map_err(render_error)?;
    let final_url = match UrlScheme::detect(url) {
        Some(UrlScheme::Raw) => url.to_string(),
        _ => page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string()),
    };

    Ok(RenderedPage {
        url: final_url,
        status_code: None,
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::prepare_content;
    use crate::request::InputFormat;

    const SCRIPTED_PAGE: &str = "raw:<html><body><div id=\"posts\"></div><script>\
        document.getElementById('posts').innerHTML = '<h2>Post A</h2><time>2025-01-01</time>';\
        </script></body></html>";

    #[test]
    fn test_browser_args_carry_user_agent() {
        let config = BrowserConfig {
            user_agent: "glean-test/1.0".to_string(),
            page_timeout_secs: 5,
        };

        let args = browser_args(&config);

        assert_eq!(args[0], "--user-agent=glean-test/1.0");
        assert!(args.iter().all(|arg| arg.starts_with("--")));
    }

    #[tokio::test]
    #[ignore = "needs a local Chrome or Chromium"]
    async fn test_browser_runs_page_scripts() {
        let mut session = ChromeSessionProvider::default().open(true).await.unwrap();
        let page = session.render(SCRIPTED_PAGE).await.unwrap();
        session.close().await.unwrap();

        let text = prepare_content(&page.html, InputFormat::PlainText);
        assert!(text.contains("Post A"));
        assert!(text.contains("2025-01-01"));
    }

    #[tokio::test]
    #[ignore = "needs a local Chrome or Chromium"]
    async fn test_dropped_session_is_released() {
        let mut session = ChromeSessionProvider::default().open(true).await.unwrap();
        session.abort();

        assert!(session.browser.is_none());
        assert!(matches!(
            session.render("raw:<p>x</p>").await,
            Err(EngineError::Session(_))
        ));
    }
}
