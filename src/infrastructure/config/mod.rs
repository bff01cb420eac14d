//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - Optional YAML file
//! - Environment variable overrides
//! - Flag overrides
//! - Validation before any polling starts

pub mod loader;

pub use loader::{
    ConfigError, ConfigLoader, ConfigOverrides, GitHubOverrides, IgnoreOverrides,
    LoggingOverrides, PollingOverrides,
};
