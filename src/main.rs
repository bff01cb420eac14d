//! commit-gate CLI entry point.

use clap::error::ErrorKind;

use commit_gate::application::{GateStatus, ResultReporter};
use commit_gate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse_inputs() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("{err}");
            // Malformed inputs are configuration errors; the pipeline still gets its signal.
            let _ = ResultReporter::stdout().emit(GateStatus::Failure);
            std::process::exit(2);
        }
    };

    let code = commit_gate::cli::execute(cli).await;
    std::process::exit(code);
}
