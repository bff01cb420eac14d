//! Check source port - interface for anything that reports checks on a commit.

use async_trait::async_trait;

use crate::domain::errors::GateResult;
use crate::domain::models::{CheckEntry, CheckRunPolicy, CommitRef, SourceKind};

/// A source of check entries for a commit.
///
/// Implementations fetch the current entries on every call and must not
/// retry or cache; the convergence loop owns polling. A failed fetch is
/// returned as an error, never as an empty or pending result.
#[async_trait]
pub trait CheckSource: Send + Sync {
    /// Which kind of source this is. Selects the ignore set.
    fn kind(&self) -> SourceKind;

    /// Fetch the current entries for `commit`.
    async fn fetch(&self, commit: &CommitRef) -> GateResult<Vec<CheckEntry>>;

    /// Whether a single entry from this source counts as succeeded.
    fn is_success(&self, entry: &CheckEntry) -> bool {
        entry.is_success(CheckRunPolicy::default())
    }
}
