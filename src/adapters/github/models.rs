//! GitHub commit status and check-run response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. They are
//! internal to the GitHub adapter; sources convert them into
//! [`CheckEntry`](crate::domain::models::CheckEntry) values.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A paginated list response that reports its total size.
pub trait Paginated: DeserializeOwned {
    type Item;

    /// Total number of items across all pages.
    fn total_count(&self) -> u64;

    /// Items on this page.
    fn into_items(self) -> Vec<Self::Item>;
}

/// Response of `GET /repos/{owner}/{repo}/commits/{ref}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCombinedStatus {
    /// Overall state: "failure", "pending" or "success".
    pub state: String,
    /// Latest status per context.
    #[serde(default)]
    pub statuses: Vec<GitHubStatus>,
    /// Commit the statuses belong to.
    #[serde(default)]
    pub sha: Option<String>,
    /// Number of statuses across all pages.
    #[serde(default)]
    pub total_count: u64,
}

impl Paginated for GitHubCombinedStatus {
    type Item = GitHubStatus;

    fn total_count(&self) -> u64 {
        self.total_count
    }

    fn into_items(self) -> Vec<GitHubStatus> {
        self.statuses
    }
}

/// A single commit status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubStatus {
    /// Label identifying the reporter (e.g. "ci/test").
    pub context: String,
    /// "error", "failure", "pending" or "success".
    pub state: String,
    /// Free-text summary set by the reporter.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the reporter's details page.
    #[serde(default)]
    pub target_url: Option<String>,
}

/// Response of `GET /repos/{owner}/{repo}/commits/{ref}/check-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCheckRunList {
    /// Number of check-runs across all pages.
    pub total_count: u64,
    /// Check-runs on this page.
    #[serde(default)]
    pub check_runs: Vec<GitHubCheckRun>,
}

impl Paginated for GitHubCheckRunList {
    type Item = GitHubCheckRun;

    fn total_count(&self) -> u64 {
        self.total_count
    }

    fn into_items(self) -> Vec<GitHubCheckRun> {
        self.check_runs
    }
}

/// A single check-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCheckRun {
    /// Check-run id.
    pub id: u64,
    /// Name shown in the checks UI; matched against ignore sets.
    pub name: String,
    /// "queued", "in_progress", "completed", "waiting", "requested" or "pending".
    pub status: String,
    /// Set once completed: "success", "failure", "neutral", "cancelled",
    /// "skipped", "timed_out", "action_required" or "stale".
    #[serde(default)]
    pub conclusion: Option<String>,
    /// Link to the run on github.com.
    #[serde(default)]
    pub html_url: Option<String>,
}
