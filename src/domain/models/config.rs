//! Configuration model for the gate.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::check::{CheckRunPolicy, IgnoreSet, NameList, SourceKind};

/// Main configuration structure for the commit gate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Commit and API access
    #[serde(default)]
    pub github: GitHubConfig,

    /// Polling loop configuration
    #[serde(default)]
    pub polling: PollingConfig,

    /// Names excluded per source
    #[serde(default)]
    pub ignore: IgnoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Commit under test and credentials for the hosting API
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// Repository in `owner/name` form
    #[serde(default)]
    pub repository: String,

    /// Revision hash to gate on
    #[serde(default)]
    pub sha: String,

    /// API token
    #[serde(default)]
    pub token: String,

    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            sha: String::new(),
            token: String::new(),
            api_url: default_api_url(),
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("repository", &self.repository)
            .field("sha", &self.sha)
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Polling loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollingConfig {
    /// Seconds to sleep between rounds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,

    /// Give up after this many rounds (unbounded when unset)
    #[serde(default)]
    pub max_rounds: Option<u32>,

    /// Give up after this many seconds (unbounded when unset)
    #[serde(default)]
    pub timeout_secs: Option<f64>,

    /// Sources polled each round
    #[serde(
        default = "default_sources",
        deserialize_with = "deserialize_sources"
    )]
    pub sources: Vec<SourceKind>,

    /// How completed check-runs are judged
    #[serde(default)]
    pub check_run_policy: CheckRunPolicy,
}

const fn default_interval_secs() -> f64 {
    10.0
}

fn default_sources() -> Vec<SourceKind> {
    SourceKind::ALL.to_vec()
}

fn deserialize_sources<'de, D>(deserializer: D) -> Result<Vec<SourceKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut sources = Vec::new();
    for item in NameList::deserialize(deserializer)?.into_items() {
        let kind = item.parse::<SourceKind>().map_err(serde::de::Error::custom)?;
        if !sources.contains(&kind) {
            sources.push(kind);
        }
    }
    Ok(sources)
}

impl PollingConfig {
    /// Sleep between rounds. Only meaningful after validation.
    pub fn interval(&self) -> Duration {
        saturating_secs(self.interval_secs)
    }

    /// Overall deadline for the run, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(saturating_secs)
    }
}

/// Seconds to a [`Duration`], clamped instead of panicking.
fn saturating_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_rounds: None,
            timeout_secs: None,
            sources: default_sources(),
            check_run_policy: CheckRunPolicy::default(),
        }
    }
}

/// Ignore lists, one per source kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IgnoreConfig {
    /// Status contexts that never block the gate
    #[serde(default)]
    pub contexts: IgnoreSet,

    /// Check-run names that never block the gate
    #[serde(default)]
    pub check_runs: IgnoreSet,
}

impl IgnoreConfig {
    /// The ignore set that applies to the given source.
    pub const fn for_source(&self, source: SourceKind) -> &IgnoreSet {
        match source {
            SourceKind::Status => &self.contexts,
            SourceKind::CheckRun => &self.check_runs,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation for file logs: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
