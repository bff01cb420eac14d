//! Check-runs as a check source.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::GateResult;
use crate::domain::models::{CheckEntry, CheckRunPolicy, CommitRef, SourceKind};
use crate::domain::ports::CheckSource;

use super::client::GitHubClient;

/// Reads the checks API.
///
/// Whether a completed run must also have a `success` conclusion is decided
/// by the configured [`CheckRunPolicy`].
pub struct CheckRunSource {
    client: Arc<GitHubClient>,
    policy: CheckRunPolicy,
}

impl CheckRunSource {
    /// Judge completed runs with `policy`.
    pub const fn new(client: Arc<GitHubClient>, policy: CheckRunPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl CheckSource for CheckRunSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CheckRun
    }

    async fn fetch(&self, commit: &CommitRef) -> GateResult<Vec<CheckEntry>> {
        let runs = self.client.list_check_runs(commit).await?;
        Ok(runs
            .into_iter()
            .map(|run| CheckEntry::check_run(run.name, run.status, run.conclusion))
            .collect())
    }

    fn is_success(&self, entry: &CheckEntry) -> bool {
        entry.is_success(self.policy)
    }
}
