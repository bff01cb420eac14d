//! GitHub check sources.
//!
//! Polls the combined commit status and check-run endpoints for a single
//! commit. Both sources share one [`GitHubClient`].

pub mod check_run_source;
pub mod client;
pub mod models;
pub mod status_source;

use std::sync::Arc;

pub use check_run_source::CheckRunSource;
pub use client::GitHubClient;
pub use status_source::StatusSource;

use crate::domain::models::{CheckRunPolicy, SourceKind};
use crate::domain::ports::CheckSource;

/// Build the configured sources over one shared client.
pub fn build_sources(
    client: &Arc<GitHubClient>,
    kinds: &[SourceKind],
    policy: CheckRunPolicy,
) -> Vec<Arc<dyn CheckSource>> {
    kinds
        .iter()
        .map(|kind| -> Arc<dyn CheckSource> {
            match kind {
                SourceKind::Status => Arc::new(StatusSource::new(Arc::clone(client))),
                SourceKind::CheckRun => {
                    Arc::new(CheckRunSource::new(Arc::clone(client), policy))
                }
            }
        })
        .collect()
}
