//! Command-line entry point.
//!
//! Loads and validates configuration, installs logging, wires the GitHub
//! sources into the convergence loop and reports the outcome.

pub mod types;

use std::io::Write;
use std::sync::Arc;

use tracing::{error, info};

pub use types::Cli;

use crate::adapters::github::{build_sources, GitHubClient};
use crate::application::{ConvergenceLoop, ResultReporter};
use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{CommitRef, Config, LoggingConfig, PollOutcome};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LoggerImpl, SecretScrubber};

/// Run the gate for the parsed command line and return the exit code.
pub async fn execute(cli: Cli) -> i32 {
    execute_with(cli, &mut ResultReporter::stdout()).await
}

/// Run the gate, writing the status line through `reporter`.
pub async fn execute_with<W: Write>(cli: Cli, reporter: &mut ResultReporter<W>) -> i32 {
    let loaded = ConfigLoader::load(cli.config.as_deref(), &cli.overrides());

    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    let _logger = match LoggerImpl::init(&logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("commit-gate: failed to initialize logging: {err:#}");
            None
        }
    };

    let token = loaded
        .as_ref()
        .map(|config| config.github.token.clone())
        .ok()
        .or_else(|| cli.token.clone())
        .unwrap_or_default();
    let scrubber = SecretScrubber::new().with_literal(token);

    let result = match loaded {
        Ok(config) => run_gate(&config).await,
        Err(err) => Err(GateError::Config(format!("{err:#}"))),
    };

    if let Err(ref err) = result {
        handle_error(err, &scrubber);
    }

    match reporter.report(&result) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "Failed to write the status output");
            1
        }
    }
}

/// Poll the configured sources until the commit converges.
pub async fn run_gate(config: &Config) -> GateResult<PollOutcome> {
    let commit = CommitRef::parse(&config.github.repository, &config.github.sha)?;
    let client = Arc::new(GitHubClient::with_base_url(
        config.github.token.clone(),
        config.github.api_url.as_str(),
    ));
    let sources = build_sources(
        &client,
        &config.polling.sources,
        config.polling.check_run_policy,
    );

    info!(
        commit = %commit,
        sources = ?config.polling.sources,
        ignored_contexts = ?config.ignore.contexts.iter().collect::<Vec<_>>(),
        ignored_check_runs = ?config.ignore.check_runs.iter().collect::<Vec<_>>(),
        interval_secs = config.polling.interval_secs,
        "Waiting for checks"
    );

    ConvergenceLoop::new(sources, config.ignore.clone(), config.polling.interval())
        .with_max_rounds(config.polling.max_rounds)
        .with_timeout(config.polling.timeout())
        .run(&commit)
        .await
}

/// Log a fatal error with secrets removed.
pub fn handle_error(err: &GateError, scrubber: &SecretScrubber) {
    let message = scrubber.scrub_message(&err.to_string());
    match err {
        GateError::Config(_) => error!(kind = "config", "{message}"),
        GateError::Fetch { kind, .. } => error!(kind = "fetch", source = %kind, "{message}"),
        GateError::Timeout { rounds, .. } => error!(kind = "timeout", rounds, "{message}"),
    }
}
