use crate::config::types::{BrowserConfig, Config, EngineConfig, LoggingConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_browser_config(&config.browser)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates LLM runtime settings
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    validate_engine_url(&config.base_url)?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if let Some(token) = &config.api_token {
        if token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api_token cannot be blank; remove it instead".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks that a runtime base URL is an absolute HTTP(S) URL
///
/// Shared with the `--engine-url` override.
pub(crate) fn validate_engine_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    Ok(())
}

/// Validates page renderer settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.page_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page_timeout_secs must be >= 1, got {}",
            config.page_timeout_secs
        )));
    }

    Ok(())
}

/// Validates logging settings
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if config.error_log.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "error_log cannot be empty".to_string(),
        ));
    }

    Ok(())
}
