//! Filtering and aggregation of check entries.
//!
//! Each source's entries are filtered against that source's ignore set and
//! then reduced to a single verdict. A round passes only when every
//! source's verdict does.

use crate::domain::models::{CheckEntry, IgnoreSet, RoundResult, SourceKind, SourceVerdict};

/// Drop every entry whose name is in `ignore`.
pub fn filter_ignored(entries: Vec<CheckEntry>, ignore: &IgnoreSet) -> Vec<CheckEntry> {
    if ignore.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| !ignore.contains(&entry.name))
        .collect()
}

/// True when every entry satisfies `is_success`. Vacuously true when empty.
pub fn all_succeeded<F>(entries: &[CheckEntry], is_success: F) -> bool
where
    F: Fn(&CheckEntry) -> bool,
{
    entries.iter().all(is_success)
}

/// Filter one source's entries and evaluate them.
pub fn evaluate_source<F>(
    source: SourceKind,
    entries: Vec<CheckEntry>,
    ignore: &IgnoreSet,
    is_success: F,
) -> SourceVerdict
where
    F: Fn(&CheckEntry) -> bool,
{
    let entries = filter_ignored(entries, ignore);
    let blocking = entries
        .iter()
        .filter(|entry| !is_success(entry))
        .map(|entry| entry.name.clone())
        .collect();
    SourceVerdict {
        source,
        entries,
        blocking,
    }
}

/// Combine per-source verdicts into one round result.
pub fn combine(verdicts: Vec<SourceVerdict>) -> RoundResult {
    RoundResult { verdicts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CheckRunPolicy;

    fn status_ok(entry: &CheckEntry) -> bool {
        entry.is_success(CheckRunPolicy::Completed)
    }

    #[test]
    fn test_empty_entries_succeed() {
        assert!(all_succeeded(&[], status_ok));
        let verdict = evaluate_source(SourceKind::Status, vec![], &IgnoreSet::default(), status_ok);
        assert!(verdict.succeeded());
    }

    #[test]
    fn test_single_pending_entry_blocks() {
        let entries = vec![
            CheckEntry::status("ci/test", "success"),
            CheckEntry::status("ci/lint", "pending"),
        ];
        assert!(!all_succeeded(&entries, status_ok));
        let verdict = evaluate_source(
            SourceKind::Status,
            entries,
            &IgnoreSet::default(),
            status_ok,
        );
        assert!(!verdict.succeeded());
        assert_eq!(verdict.blocking, vec!["ci/lint".to_string()]);
    }

    #[test]
    fn test_ignored_failure_does_not_block() {
        let entries = vec![
            CheckEntry::status("ci/test", "success"),
            CheckEntry::status("flaky", "failure"),
        ];
        let verdict = evaluate_source(
            SourceKind::Status,
            entries,
            &IgnoreSet::from_csv("flaky"),
            status_ok,
        );
        assert!(verdict.succeeded());
        assert_eq!(verdict.entries.len(), 1);
    }

    #[test]
    fn test_everything_ignored_is_vacuous_success() {
        let entries = vec![CheckEntry::status("flaky", "error")];
        let verdict = evaluate_source(
            SourceKind::Status,
            entries,
            &IgnoreSet::from_csv("flaky"),
            status_ok,
        );
        assert!(verdict.succeeded());
        assert!(verdict.entries.is_empty());
    }

    #[test]
    fn test_combine_is_logical_and() {
        let ok = evaluate_source(SourceKind::Status, vec![], &IgnoreSet::default(), status_ok);
        let pending = evaluate_source(
            SourceKind::CheckRun,
            vec![CheckEntry::check_run("build", "in_progress", None)],
            &IgnoreSet::default(),
            status_ok,
        );
        assert!(combine(vec![ok.clone()]).all_succeeded());
        assert!(!combine(vec![ok, pending]).all_succeeded());
        assert!(combine(vec![]).all_succeeded());
    }
}
