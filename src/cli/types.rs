//! CLI type definitions
//!
//! Every input can come from a flag or from the environment GitHub Actions
//! sets up for a job (`GITHUB_*` and `INPUT_*` variables).

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser};

use crate::infrastructure::config::{
    ConfigOverrides, GitHubOverrides, IgnoreOverrides, LoggingOverrides, PollingOverrides,
};

/// Command-line and environment inputs.
#[derive(Parser, Debug, Default)]
#[command(name = "commit-gate")]
#[command(
    about = "Wait until every status and check-run on a commit has converged",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Commit sha to gate on
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Comma-separated status contexts to ignore
    #[arg(long, env = "INPUT_IGNORECONTEXTS")]
    pub ignore_contexts: Option<String>,

    /// Comma-separated check-run names to ignore
    #[arg(long, env = "INPUT_IGNORECHECKRUNS")]
    pub ignore_check_runs: Option<String>,

    /// Seconds between polling rounds
    #[arg(long, env = "INPUT_CHECKINTERVAL")]
    pub interval: Option<f64>,

    /// Comma-separated sources to poll: status, check-runs
    #[arg(long, env = "INPUT_SOURCES")]
    pub sources: Option<String>,

    /// How completed check-runs are judged: completed or conclusion
    #[arg(long, env = "INPUT_CHECKRUNPOLICY")]
    pub check_run_policy: Option<String>,

    /// Fail after this many rounds without convergence
    #[arg(long, env = "INPUT_MAXROUNDS")]
    pub max_rounds: Option<u32>,

    /// Fail after this many seconds without convergence
    #[arg(long, env = "INPUT_TIMEOUT")]
    pub timeout: Option<f64>,

    /// YAML config file
    #[arg(short, long, env = "COMMIT_GATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format: json or pretty
    #[arg(long)]
    pub log_format: Option<String>,

    /// Directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments and environment.
    pub fn try_parse_inputs() -> Result<Self, clap::Error> {
        Self::try_parse_inputs_from(std::env::args_os())
    }

    /// Parse `args`, treating environment inputs that are set but empty as
    /// unset. Actions passes every declared input, so an omitted one
    /// arrives as `INPUT_X=""`.
    pub fn try_parse_inputs_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command();
        let empty: Vec<clap::Id> = command
            .get_arguments()
            .filter(|arg| {
                arg.get_env()
                    .and_then(std::env::var_os)
                    .is_some_and(|value| value.is_empty())
            })
            .map(|arg| arg.get_id().clone())
            .collect();
        for id in empty {
            command = command.mut_arg(id, |arg| arg.env(None::<&str>));
        }

        let matches = command.try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Top configuration layer built from the parsed flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            github: GitHubOverrides {
                repository: self.repository.clone(),
                sha: self.sha.clone(),
                token: self.token.clone(),
                api_url: self.api_url.clone(),
            },
            polling: PollingOverrides {
                interval_secs: self.interval,
                max_rounds: self.max_rounds,
                timeout_secs: self.timeout,
                sources: self.sources.clone(),
                check_run_policy: self.check_run_policy.clone(),
            },
            ignore: IgnoreOverrides {
                contexts: self.ignore_contexts.clone(),
                check_runs: self.ignore_check_runs.clone(),
            },
            logging: LoggingOverrides {
                level: self.log_level.clone(),
                format: self.log_format.clone(),
                log_dir: self.log_dir.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "commit-gate",
            "--repository",
            "octo-org/widgets",
            "--sha",
            "abc123",
            "--interval",
            "2.5",
            "--ignore-contexts",
            "ci/lint,flaky",
            "--max-rounds",
            "10",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.github.repository.as_deref(), Some("octo-org/widgets"));
        assert_eq!(overrides.polling.interval_secs, Some(2.5));
        assert_eq!(overrides.polling.max_rounds, Some(10));
        assert_eq!(overrides.ignore.contexts.as_deref(), Some("ci/lint,flaky"));
    }

    #[test]
    fn test_actions_environment_is_read() {
        temp_env::with_vars(
            [
                ("GITHUB_REPOSITORY", Some("octo-org/widgets")),
                ("GITHUB_SHA", Some("abc123")),
                ("GITHUB_TOKEN", Some("ghp_env")),
                ("INPUT_IGNORECONTEXTS", Some("flaky")),
                ("INPUT_CHECKINTERVAL", Some("7")),
            ],
            || {
                let cli = Cli::try_parse_from(["commit-gate"]).unwrap();
                assert_eq!(cli.repository.as_deref(), Some("octo-org/widgets"));
                assert_eq!(cli.token.as_deref(), Some("ghp_env"));
                assert_eq!(cli.ignore_contexts.as_deref(), Some("flaky"));
                assert_eq!(cli.interval, Some(7.0));
            },
        );
    }

    #[test]
    fn test_empty_action_inputs_are_unset() {
        temp_env::with_vars(
            [
                ("INPUT_CHECKINTERVAL", Some("")),
                ("INPUT_MAXROUNDS", Some("")),
                ("INPUT_CHECKRUNPOLICY", Some("")),
                ("INPUT_IGNORECONTEXTS", Some("flaky")),
            ],
            || {
                let cli = Cli::try_parse_inputs_from(["commit-gate"]).unwrap();
                assert_eq!(cli.interval, None);
                assert_eq!(cli.max_rounds, None);
                assert_eq!(cli.check_run_policy, None);
                assert_eq!(cli.ignore_contexts.as_deref(), Some("flaky"));
            },
        );
    }

    #[test]
    fn test_flag_still_wins_over_empty_input() {
        temp_env::with_var("INPUT_CHECKINTERVAL", Some(""), || {
            let cli = Cli::try_parse_inputs_from(["commit-gate", "--interval", "3"]).unwrap();
            assert_eq!(cli.interval, Some(3.0));
        });
    }

    #[test]
    fn test_rejects_non_numeric_interval() {
        assert!(Cli::try_parse_from(["commit-gate", "--interval", "soon"]).is_err());
    }
}
