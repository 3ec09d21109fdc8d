//! Configuration management for reportforge
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `REPORTFORGE__<section>__<key>`
//!
//! Examples:
//! - `REPORTFORGE__API__BASE_URL=https://reports.example.com`
//! - `REPORTFORGE__BROKER__HOST=broker.example.com`
//! - `REPORTFORGE__OUTPUT__DOCUMENT_DIR=/var/lib/reportforge/out`
//!
//! Secrets (`API_AUTH_PASSWORD`, `BROKER_PASSWORD`) are read from the plain
//! environment only and never from the TOML file.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/reportforge.toml`.
//! This can be overridden using the `REPORTFORGE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{ApiConfig, BrokerConfig, Config, OutputConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`REPORTFORGE__*`)
    /// 2. TOML file (default: `config/reportforge.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation
    /// fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
