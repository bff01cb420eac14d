//! Domain models: checks, verdicts and configuration.

pub mod check;
pub mod config;

pub use check::{
    CheckEntry, CheckRunPolicy, CommitRef, IgnoreSet, NameList, PollOutcome, RoundResult,
    SourceKind, SourceVerdict,
};
pub use config::{Config, GitHubConfig, IgnoreConfig, LoggingConfig, PollingConfig};
