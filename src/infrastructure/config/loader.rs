//! Layered configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::Serialize;
use thiserror::Error;

use crate::domain::errors::GateError;
use crate::domain::models::{CommitRef, Config};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is empty.
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    /// Repository is not `owner/name`.
    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    /// Interval is not a positive, representable number of seconds.
    #[error("Invalid poll interval: {0}. Must be a positive number of seconds")]
    InvalidInterval(f64),

    /// Timeout is not a positive, representable number of seconds.
    #[error("Invalid timeout: {0}. Must be a positive number of seconds")]
    InvalidTimeout(f64),

    /// `max_rounds` is zero.
    #[error("Invalid max_rounds: 0. Must be at least 1")]
    InvalidMaxRounds,

    /// Source list is empty.
    #[error("No sources configured. Enable at least one of: status, check-runs")]
    NoSources,

    /// API URL is not http(s).
    #[error("Invalid api_url: {0}. Must start with http:// or https://")]
    InvalidApiUrl(String),

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown rotation policy.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    /// `--config` points at nothing.
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),
}

impl From<ConfigError> for GateError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Highest-priority settings, usually from command-line flags or the
/// GitHub Actions environment. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    /// Overrides for `github`.
    pub github: GitHubOverrides,
    /// Overrides for `polling`.
    pub polling: PollingOverrides,
    /// Overrides for `ignore`.
    pub ignore: IgnoreOverrides,
    /// Overrides for `logging`.
    pub logging: LoggingOverrides,
}

/// See [`GitHubConfig`](crate::domain::models::GitHubConfig).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GitHubOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// `owner/name`.
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Commit to gate on.
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// API token.
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// API root.
    pub api_url: Option<String>,
}

/// See [`PollingConfig`](crate::domain::models::PollingConfig).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Seconds between rounds.
    pub interval_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Round limit.
    pub max_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Deadline in seconds.
    pub timeout_secs: Option<f64>,
    /// Comma-separated source kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// `completed` or `conclusion`.
    pub check_run_policy: Option<String>,
}

/// See [`IgnoreConfig`](crate::domain::models::IgnoreConfig).
#[derive(Debug, Clone, Default, Serialize)]
pub struct IgnoreOverrides {
    /// Comma-separated status contexts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contexts: Option<String>,
    /// Comma-separated check-run names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_runs: Option<String>,
}

/// See [`LoggingConfig`](crate::domain::models::LoggingConfig).
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoggingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Log level.
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// `json` or `pretty`.
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Environment prefix for nested settings, e.g. `COMMIT_GATE_POLLING__INTERVAL_SECS`.
    pub const ENV_PREFIX: &'static str = "COMMIT_GATE_";

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. Optional YAML config file
    /// 3. Environment variables (COMMIT_GATE_* prefix, `__` for nesting)
    /// 4. Overrides from flags and the GitHub Actions environment
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()).into());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Required inputs
        if config.github.repository.trim().is_empty() {
            return Err(ConfigError::MissingField("github.repository"));
        }
        if config.github.sha.trim().is_empty() {
            return Err(ConfigError::MissingField("github.sha"));
        }
        if config.github.token.trim().is_empty() {
            return Err(ConfigError::MissingField("github.token"));
        }
        if let Err(err) = CommitRef::parse(&config.github.repository, &config.github.sha) {
            return Err(ConfigError::InvalidRepository(err.to_string()));
        }

        let api_url = &config.github.api_url;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url.clone()));
        }

        // Polling
        let interval = config.polling.interval_secs;
        if !is_positive_duration(interval) {
            return Err(ConfigError::InvalidInterval(interval));
        }

        if let Some(timeout) = config.polling.timeout_secs {
            if !is_positive_duration(timeout) {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
        }

        if config.polling.max_rounds == Some(0) {
            return Err(ConfigError::InvalidMaxRounds);
        }

        if config.polling.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}

/// Positive, finite and small enough to be a [`Duration`].
fn is_positive_duration(secs: f64) -> bool {
    secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok()
}
