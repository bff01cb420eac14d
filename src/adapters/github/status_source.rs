//! Combined commit status as a check source.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::GateResult;
use crate::domain::models::{CheckEntry, CommitRef, SourceKind};
use crate::domain::ports::CheckSource;

use super::client::GitHubClient;

/// Reads the legacy commit status API.
///
/// A status passes only when its state is exactly `success`.
pub struct StatusSource {
    client: Arc<GitHubClient>,
}

impl StatusSource {
    /// Read statuses through `client`.
    pub const fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CheckSource for StatusSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Status
    }

    async fn fetch(&self, commit: &CommitRef) -> GateResult<Vec<CheckEntry>> {
        let statuses = self.client.get_combined_status(commit).await?;
        Ok(statuses
            .into_iter()
            .map(|status| CheckEntry::status(status.context, status.state))
            .collect())
    }
}
