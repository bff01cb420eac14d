//! ConvergenceLoop - polls every check source until the commit converges
//!
//! Each round fetches all configured sources concurrently, filters and
//! aggregates their entries, and either finishes (every source succeeded)
//! or sleeps for the poll interval before the next round. Rounds never
//! overlap. The first fetch error aborts the run.
//!
//! The loop is unbounded unless a round limit or a timeout is configured.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, instrument};

use super::aggregator;
use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{CommitRef, IgnoreConfig, PollOutcome, RoundResult};
use crate::domain::ports::CheckSource;

/// Repeatedly evaluates a set of check sources for one commit.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use commit_gate::adapters::github::{CheckRunSource, GitHubClient, StatusSource};
/// use commit_gate::application::ConvergenceLoop;
/// use commit_gate::domain::models::{CheckRunPolicy, CommitRef, IgnoreConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = Arc::new(GitHubClient::new("ghp_token".to_string()));
///     let gate = ConvergenceLoop::new(
///         vec![
///             Arc::new(StatusSource::new(client.clone())),
///             Arc::new(CheckRunSource::new(client, CheckRunPolicy::Completed)),
///         ],
///         IgnoreConfig::default(),
///         Duration::from_secs(10),
///     );
///     let commit = CommitRef::parse("octo-org/widgets", "abc123")?;
///     let outcome = gate.run(&commit).await?;
///     println!("converged after {} round(s)", outcome.rounds);
///     Ok(())
/// }
/// ```
pub struct ConvergenceLoop {
    sources: Vec<Arc<dyn CheckSource>>,
    ignore: IgnoreConfig,
    interval: Duration,
    max_rounds: Option<u32>,
    timeout: Option<Duration>,
}

impl ConvergenceLoop {
    /// Poll `sources` every `interval` with no round or time limit.
    pub fn new(
        sources: Vec<Arc<dyn CheckSource>>,
        ignore: IgnoreConfig,
        interval: Duration,
    ) -> Self {
        Self {
            sources,
            ignore,
            interval,
            max_rounds: None,
            timeout: None,
        }
    }

    /// Fail with [`GateError::Timeout`] after this many unconverged rounds.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: Option<u32>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Fail with [`GateError::Timeout`] once `timeout` has passed.
    ///
    /// The deadline also bounds an in-flight round: a fetch still pending
    /// when it expires is dropped.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one round: fetch every source concurrently and aggregate.
    ///
    /// Fails fast: the first fetch error is returned and the remaining
    /// fetches are dropped.
    pub async fn poll_round(&self, commit: &CommitRef) -> GateResult<RoundResult> {
        let fetches = self.sources.iter().map(|source| async move {
            let kind = source.kind();
            let entries = source.fetch(commit).await?;
            debug!(source = %kind, count = entries.len(), "Fetched entries");
            Ok::<_, GateError>(aggregator::evaluate_source(
                kind,
                entries,
                self.ignore.for_source(kind),
                |entry| source.is_success(entry),
            ))
        });

        let verdicts = try_join_all(fetches).await?;
        Ok(aggregator::combine(verdicts))
    }

    /// Poll until every source succeeds.
    ///
    /// The first round starts immediately. Returns the number of rounds
    /// run once a round passes; no further rounds are started after that.
    #[instrument(skip_all, fields(commit = %commit))]
    pub async fn run(&self, commit: &CommitRef) -> GateResult<PollOutcome> {
        let started = Instant::now();
        let mut rounds: u32 = 0;

        loop {
            rounds += 1;
            let round = match self.timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    timeout(remaining, self.poll_round(commit))
                        .await
                        .map_err(|_| GateError::Timeout {
                            rounds,
                            elapsed: started.elapsed(),
                        })??
                }
                None => self.poll_round(commit).await?,
            };

            if round.all_succeeded() {
                let elapsed = started.elapsed();
                info!(
                    rounds,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "All checks succeeded"
                );
                return Ok(PollOutcome { rounds, elapsed });
            }

            log_round(rounds, &round);

            if self.max_rounds.is_some_and(|max| rounds >= max) {
                return Err(GateError::Timeout {
                    rounds,
                    elapsed: started.elapsed(),
                });
            }
            if let Some(limit) = self.timeout {
                if started.elapsed().saturating_add(self.interval) > limit {
                    return Err(GateError::Timeout {
                        rounds,
                        elapsed: started.elapsed(),
                    });
                }
            }

            info!(
                interval_secs = self.interval.as_secs_f64(),
                "Checking again in {:.1} seconds",
                self.interval.as_secs_f64()
            );
            sleep(self.interval).await;
        }
    }
}

fn log_round(round_number: u32, round: &RoundResult) {
    for verdict in &round.verdicts {
        let names: Vec<&str> = verdict.entries.iter().map(|e| e.name.as_str()).collect();
        info!(
            round = round_number,
            source = %verdict.source,
            succeeded = verdict.succeeded(),
            "Checking {} {}: {}",
            names.len(),
            verdict.source,
            names.join(", ")
        );
        for entry in &verdict.entries {
            info!(
                source = %entry.source,
                name = %entry.name,
                state = %entry.state,
                conclusion = entry.conclusion.as_deref().unwrap_or("-"),
                "{}: {}",
                entry.name,
                entry.state
            );
        }
    }
}
