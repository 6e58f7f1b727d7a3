use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} URL cannot be empty")]
    EmptyServiceUrl(&'static str),

    #[error("Model vendor and model name cannot be empty")]
    EmptyModel,

    #[error("Invalid bug_probability: {0}. Must be between 0.0 and 1.0")]
    InvalidBugProbability(f64),

    #[error("Invalid debounce_ms: {0}. Must be at least 1")]
    InvalidDebounce(u64),

    #[error("Invalid acceptance_threshold: {0}. Must be at least 1")]
    InvalidAcceptanceThreshold(usize),

    #[error("Invalid bug percentage cutoff: {0}. Must be between 0 and 100")]
    InvalidBugPercentage(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .clover/config.yaml (project config)
    /// 3. .clover/local.yaml (local overrides, optional)
    /// 4. Environment variables (CLOVER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".clover/config.yaml"))
            .merge(Yaml::file(".clover/local.yaml"))
            .merge(Env::prefixed("CLOVER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("CLOVER_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Sampling parameters are deliberately left alone: they are forwarded
    /// to the AI service unexamined.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        for (name, url) in [
            ("AI service", &config.service.ai_base_url),
            ("Log service", &config.service.log_base_url),
            ("User store", &config.service.user_base_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyServiceUrl(name));
            }
        }

        if config.model.vendor.trim().is_empty() || config.model.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        let probability = config.engine.bug_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidBugProbability(probability));
        }

        if config.engine.debounce_ms == 0 {
            return Err(ConfigError::InvalidDebounce(config.engine.debounce_ms));
        }

        if config.policy.acceptance_threshold == 0 {
            return Err(ConfigError::InvalidAcceptanceThreshold(
                config.policy.acceptance_threshold,
            ));
        }

        let cutoffs = std::iter::once(config.policy.bug_percentage)
            .chain(config.policy.tightened_bug_percentage);
        for cutoff in cutoffs {
            if !(0.0..=100.0).contains(&cutoff) {
                return Err(ConfigError::InvalidBugPercentage(cutoff));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
