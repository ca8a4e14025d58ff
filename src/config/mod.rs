//! Configuration module for Glean
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file that tunes the page renderer, the LLM runtime
//! connection, and logging.
//!
//! # Example
//!
//! ```no_run
//! use glean::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("glean.toml")).unwrap();
//! println!("LLM runtime at: {}", config.engine.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, EngineConfig, LoggingConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, config_hash, load_config, load_config_str, load_config_with_hash};
pub use validation::validate;
pub(crate) use validation::validate_engine_url;
