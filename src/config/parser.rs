use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates a configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use glean::config::load_config;
///
/// let config = load_config(Path::new("glean.toml")).unwrap();
/// println!("Page timeout: {}s", config.browser.page_timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_str(&std::fs::read_to_string(path)?)
}

/// Parses and validates configuration text
///
/// # Returns
///
/// * `Ok(Config)` - Parsed, with defaults filled in and validated
/// * `Err(ConfigError)` - Malformed TOML or an invalid setting
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Returns the hex SHA-256 of configuration text
///
/// Logged at start-up so a run can be matched to the exact settings it used.
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Hashes a configuration file without parsing it
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(config_hash(&std::fs::read_to_string(path)?))
}

/// Loads a configuration and hashes the exact text it was parsed from
///
/// The file is read once, so the hash always matches the loaded settings.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = load_config_str(&content)?;
    Ok((config, config_hash(&content)))
}
