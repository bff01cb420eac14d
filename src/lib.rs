//! commit-gate - wait for a commit's checks to converge
//!
//! A gating step for CI pipelines: it polls the GitHub combined-status and
//! check-run APIs for one commit until every signal that is not ignored has
//! succeeded, then reports `success` (or `failure` on any fatal error) in the
//! pipeline's output-assignment syntax.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): check entries, configuration model, errors and the `CheckSource` port
//! - **Application Layer** (`application`): filtering, aggregation, the convergence loop and the reporter
//! - **Adapters** (`adapters`): GitHub status and check-run sources over a shared HTTP client
//! - **Infrastructure Layer** (`infrastructure`): configuration loading and logging
//! - **CLI Layer** (`cli`): argument parsing and wiring
//!
//! # Example
//!
//! ```ignore
//! use commit_gate::cli::{run_gate, Cli};
//! use commit_gate::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None, &Cli::default().overrides())?;
//!     let outcome = run_gate(&config).await?;
//!     println!("converged after {} round(s)", outcome.rounds);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::{ConvergenceLoop, GateStatus, ResultReporter};
pub use domain::errors::{GateError, GateResult};
pub use domain::models::{
    CheckEntry, CheckRunPolicy, CommitRef, Config, IgnoreSet, PollOutcome, RoundResult,
    SourceKind,
};
pub use domain::ports::CheckSource;
pub use infrastructure::config::{ConfigError, ConfigLoader};
