//! Configuration management for tryguard
//!
//! Base guard options that can be expressed as data (`log_prefix`, `rethrow`)
//! and the choice of diagnostic sink are loaded from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! Callbacks and default return values are code, not data; attach them to
//! the [`Options`] returned by [`Config::base_options`].
//!
//! # Usage
//!
//! ```no_run
//! use tryguard::{Guard, config::Config};
//!
//! let config = Config::load().expect("Failed to load configuration");
//! let guard: Guard<String, std::io::Error> = Guard::from_config(&config);
//! ```
//!
//! # Environment Variables
//!
//! Pattern: `TRYGUARD__<section>__<key>`
//!
//! Examples:
//! - `TRYGUARD__GUARD__LOG_PREFIX=worker`
//! - `TRYGUARD__GUARD__RETHROW=true`
//! - `TRYGUARD__REPORTING__SINK=tracing`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/tryguard.toml`.
//! This can be overridden using the `TRYGUARD_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, GuardConfig, ReportingConfig, SinkKind};
pub use validation::ValidationError;

use std::sync::Arc;
use thiserror::Error;

use crate::options::{Options, Setting};
use crate::sink::DiagnosticSink;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`TRYGUARD__*`)
    /// 2. TOML file (default: `config/tryguard.toml`)
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
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text, without file or environment layers
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Base options for a guard
    ///
    /// `rethrow` is always set; `log_prefix` only when configured.
    pub fn base_options<T, E>(&self) -> Options<T, E> {
        let mut options = Options::new().rethrow(self.guard.rethrow);
        if let Some(prefix) = &self.guard.log_prefix {
            options.log_prefix = Setting::Set(prefix.clone());
        }
        options
    }

    /// Diagnostic sink selected by `reporting.sink`
    pub fn sink(&self) -> Arc<dyn DiagnosticSink> {
        crate::sink::from_kind(self.reporting.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::resolve;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[guard]\nlog_prefix = \"TEST\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.guard.log_prefix.as_deref(), Some("TEST"));
    }

    #[test]
    fn test_validation_catches_bad_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[guard]
log_prefix = "first\nsecond"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::LogPrefixLineBreak { .. })
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
[guard]
rethrow = true

[reporting]
sink = "tracing"
            "#,
        )
        .unwrap();

        assert!(config.guard.rethrow);
        assert_eq!(config.reporting.sink, SinkKind::Tracing);

        let malformed = Config::from_toml_str("[guard\nrethrow = true");
        assert!(matches!(malformed, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_base_options_from_config() {
        let config = Config::from_toml_str("[guard]\nlog_prefix = \"TEST\"\nrethrow = false\n").unwrap();
        let options: Options<String, String> = config.base_options();

        assert_eq!(options.log_prefix, Setting::Set("TEST".to_string()));
        assert_eq!(options.rethrow, Setting::Set(false));
        assert_eq!(options.default_return_value, Setting::Unset);

        let effective = resolve(&options, None);
        assert_eq!(effective.log_prefix(), Some("TEST"));
        assert!(!effective.rethrow());
    }

    #[test]
    fn test_base_options_without_prefix() {
        let options: Options<(), String> = Config::default().base_options();
        assert_eq!(options.log_prefix, Setting::Unset);
    }
}
