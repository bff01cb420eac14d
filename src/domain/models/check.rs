//! Check domain model.
//!
//! A commit is gated on two kinds of signals: legacy commit statuses and
//! check-runs. Both are normalized into [`CheckEntry`] values so the
//! aggregator can treat them uniformly.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{GateError, GateResult};

/// Commit status state that counts as passing.
pub const STATUS_SUCCESS: &str = "success";

/// Check-run status that marks a run as finished.
pub const CHECK_RUN_COMPLETED: &str = "completed";

/// Check-run conclusion that counts as passing under [`CheckRunPolicy::Conclusion`].
pub const CHECK_RUN_CONCLUSION_SUCCESS: &str = "success";

/// The kind of status source an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    /// Legacy combined commit status.
    #[serde(rename = "status")]
    Status,
    /// Check-runs from the checks API.
    #[serde(rename = "check-runs")]
    CheckRun,
}

impl SourceKind {
    /// Both source kinds, in polling order.
    pub const ALL: [Self; 2] = [Self::Status, Self::CheckRun];

    /// Name used in configuration and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::CheckRun => "check-runs",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" | "statuses" => Ok(Self::Status),
            "check-runs" | "check_runs" | "checkruns" | "checks" => Ok(Self::CheckRun),
            other => Err(GateError::Config(format!(
                "unknown source '{other}', expected 'status' or 'check-runs'"
            ))),
        }
    }
}

/// How a completed check-run is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckRunPolicy {
    /// A run passes once its status is `completed`, whatever its conclusion.
    ///
    /// Failing runs still satisfy the gate; downstream branch protection
    /// is expected to act on the conclusion.
    #[default]
    Completed,
    /// A run passes only when it is `completed` with conclusion `success`.
    Conclusion,
}

impl FromStr for CheckRunPolicy {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "conclusion" | "strict" => Ok(Self::Conclusion),
            other => Err(GateError::Config(format!(
                "unknown check-run policy '{other}', expected 'completed' or 'conclusion'"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for CheckRunPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// The commit under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Revision hash.
    pub sha: String,
}

impl CommitRef {
    /// Build a commit reference from an `owner/name` identifier and a sha.
    pub fn parse(repository: &str, sha: &str) -> GateResult<Self> {
        let (owner, repo) = repository.trim().split_once('/').ok_or_else(|| {
            GateError::Config(format!(
                "repository '{repository}' must be in 'owner/name' form"
            ))
        })?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(GateError::Config(format!(
                "repository '{repository}' must be in 'owner/name' form"
            )));
        }
        let sha = sha.trim();
        if sha.is_empty() {
            return Err(GateError::Config("commit sha cannot be empty".to_string()));
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
        })
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.sha)
    }
}

/// A single normalized status or check-run.
///
/// `state` is the raw value reported by the API (a status `state` or a
/// check-run `status`); unknown values pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    /// Where the entry came from.
    pub source: SourceKind,
    /// Status context or check-run name; matched against ignore sets.
    pub name: String,
    /// Status `state` or check-run `status`.
    pub state: String,
    /// Check-run conclusion, absent for statuses and unfinished runs.
    pub conclusion: Option<String>,
}

impl CheckEntry {
    /// Entry for a commit status.
    pub fn status(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            source: SourceKind::Status,
            name: name.into(),
            state: state.into(),
            conclusion: None,
        }
    }

    /// Entry for a check-run.
    pub fn check_run(
        name: impl Into<String>,
        status: impl Into<String>,
        conclusion: Option<String>,
    ) -> Self {
        Self {
            source: SourceKind::CheckRun,
            name: name.into(),
            state: status.into(),
            conclusion,
        }
    }

    /// Success predicate for this entry's source.
    ///
    /// Statuses pass only on `success`. Check-runs pass on `completed`,
    /// and under [`CheckRunPolicy::Conclusion`] additionally need a
    /// `success` conclusion.
    pub fn is_success(&self, policy: CheckRunPolicy) -> bool {
        match self.source {
            SourceKind::Status => self.state == STATUS_SUCCESS,
            SourceKind::CheckRun => {
                self.state == CHECK_RUN_COMPLETED
                    && match policy {
                        CheckRunPolicy::Completed => true,
                        CheckRunPolicy::Conclusion => {
                            self.conclusion.as_deref() == Some(CHECK_RUN_CONCLUSION_SUCCESS)
                        }
                    }
            }
        }
    }
}

/// Names excluded from evaluation for one source kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NameList", into = "Vec<String>")]
pub struct IgnoreSet(BTreeSet<String>);

impl IgnoreSet {
    /// Collect names, trimming whitespace and skipping blanks.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|name| Into::<String>::into(name).trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list of names.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    /// Whether `name` is ignored.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// True when nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ignored names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ignored names, in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<IgnoreSet> for Vec<String> {
    fn from(set: IgnoreSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// Either a comma-separated string or a list of names.
///
/// Environment inputs arrive as CSV while config files use YAML lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    /// `"a, b"` as read from an environment input.
    Csv(String),
    /// A YAML or JSON sequence.
    List(Vec<String>),
}

impl NameList {
    /// Trimmed, non-empty names.
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            Self::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

impl From<NameList> for IgnoreSet {
    fn from(list: NameList) -> Self {
        Self::new(list.into_items())
    }
}

/// Evaluation of one source for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceVerdict {
    /// Source this verdict is for.
    pub source: SourceKind,
    /// Entries left after filtering.
    pub entries: Vec<CheckEntry>,
    /// Names of entries that do not satisfy the success predicate yet.
    pub blocking: Vec<String>,
}

impl SourceVerdict {
    /// True when no entry is blocking.
    pub fn succeeded(&self) -> bool {
        self.blocking.is_empty()
    }
}

/// Verdicts of every configured source for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundResult {
    /// One verdict per polled source, in polling order.
    pub verdicts: Vec<SourceVerdict>,
}

impl RoundResult {
    /// True only when every source succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.verdicts.iter().all(SourceVerdict::succeeded)
    }
}

/// Summary of a converged run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Number of rounds executed, including the converging one.
    pub rounds: u32,
    /// Time from the first fetch to convergence.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_ref_parse() {
        let commit = CommitRef::parse("octo-org/widgets", "abc123").unwrap();
        assert_eq!(commit.owner, "octo-org");
        assert_eq!(commit.repo, "widgets");
        assert_eq!(commit.sha, "abc123");
        assert_eq!(commit.to_string(), "octo-org/widgets@abc123");
    }

    #[test]
    fn test_commit_ref_rejects_malformed_repository() {
        for repo in ["widgets", "/widgets", "octo-org/", "a/b/c", ""] {
            let result = CommitRef::parse(repo, "abc123");
            assert!(
                matches!(result, Err(GateError::Config(_))),
                "expected config error for '{repo}'"
            );
        }
    }

    #[test]
    fn test_commit_ref_rejects_empty_sha() {
        assert!(matches!(
            CommitRef::parse("octo-org/widgets", "  "),
            Err(GateError::Config(_))
        ));
    }

    #[test]
    fn test_ignore_set_from_csv_trims_and_skips_empty() {
        let set = IgnoreSet::from_csv(" ci/lint, ,flaky,,");
        assert_eq!(set.len(), 2);
        assert!(set.contains("ci/lint"));
        assert!(set.contains("flaky"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_ignore_set_from_empty_csv() {
        assert!(IgnoreSet::from_csv("").is_empty());
    }

    #[test]
    fn test_ignore_set_deserializes_from_csv_or_list() {
        let from_csv: IgnoreSet = serde_json::from_str(r#""a,b""#).unwrap();
        let from_list: IgnoreSet = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(from_csv, from_list);
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("status".parse::<SourceKind>().unwrap(), SourceKind::Status);
        assert_eq!(
            "Check-Runs".parse::<SourceKind>().unwrap(),
            SourceKind::CheckRun
        );
        assert!("deployments".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_check_run_policy_parse_and_default() {
        assert_eq!(CheckRunPolicy::default(), CheckRunPolicy::Completed);
        assert_eq!(
            "conclusion".parse::<CheckRunPolicy>().unwrap(),
            CheckRunPolicy::Conclusion
        );
        assert!("eventually".parse::<CheckRunPolicy>().is_err());

        let strict: CheckRunPolicy = serde_json::from_str(r#""Strict""#).unwrap();
        assert_eq!(strict, CheckRunPolicy::Conclusion);
    }

    #[test]
    fn test_round_result_requires_every_source() {
        let round = RoundResult {
            verdicts: vec![
                SourceVerdict {
                    source: SourceKind::Status,
                    entries: vec![],
                    blocking: vec![],
                },
                SourceVerdict {
                    source: SourceKind::CheckRun,
                    entries: vec![CheckEntry::check_run("build", "queued", None)],
                    blocking: vec!["build".to_string()],
                },
            ],
        };
        assert!(!round.all_succeeded());
    }

    #[test]
    fn test_status_success_predicate() {
        assert!(CheckEntry::status("ci/test", "success").is_success(CheckRunPolicy::Completed));
        for state in ["pending", "failure", "error", "SUCCESS", "weird"] {
            assert!(
                !CheckEntry::status("ci/test", state).is_success(CheckRunPolicy::Completed),
                "{state} must not count as success"
            );
        }
    }

    #[test]
    fn test_check_run_completed_policy_ignores_conclusion() {
        let failed = CheckEntry::check_run("build", "completed", Some("failure".to_string()));
        assert!(failed.is_success(CheckRunPolicy::Completed));
        let queued = CheckEntry::check_run("build", "queued", None);
        assert!(!queued.is_success(CheckRunPolicy::Completed));
        let running = CheckEntry::check_run("build", "in_progress", None);
        assert!(!running.is_success(CheckRunPolicy::Completed));
    }

    #[test]
    fn test_check_run_conclusion_policy_requires_success() {
        let failed = CheckEntry::check_run("build", "completed", Some("failure".to_string()));
        assert!(!failed.is_success(CheckRunPolicy::Conclusion));
        let passed = CheckEntry::check_run("build", "completed", Some("success".to_string()));
        assert!(passed.is_success(CheckRunPolicy::Conclusion));
        let missing = CheckEntry::check_run("build", "completed", None);
        assert!(!missing.is_success(CheckRunPolicy::Conclusion));
    }
}
