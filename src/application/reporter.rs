//! Result reporter - turns the outcome of a gate run into the pipeline signal.
//!
//! Exactly one output-assignment line is written to the sink, carrying the
//! `status` key. Logs never go to this sink.

use std::fmt;
use std::io::{self, Write};

use crate::domain::errors::GateError;
use crate::domain::models::PollOutcome;

/// Output key the invoking pipeline reads.
pub const STATUS_OUTPUT_KEY: &str = "status";

/// Terminal status of a gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Every check converged.
    Success,
    /// The run aborted.
    Failure,
}

impl GateStatus {
    /// Value written after the output key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the output-assignment line for `status`.
pub fn output_line(status: GateStatus) -> String {
    format!("::set-output name={STATUS_OUTPUT_KEY}::{status}")
}

/// Writes the pipeline status line and maps outcomes to exit codes.
pub struct ResultReporter<W: Write> {
    out: W,
}

impl ResultReporter<io::Stdout> {
    /// Report on the process stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ResultReporter<W> {
    /// Report into `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Emit the status line.
    pub fn emit(&mut self, status: GateStatus) -> io::Result<()> {
        writeln!(self.out, "{}", output_line(status))?;
        self.out.flush()
    }

    /// Report a finished run and return the process exit code.
    ///
    /// The error itself is returned to the caller untouched so it can be
    /// logged; the reporter only decides the signal and the code.
    pub fn report(&mut self, result: &Result<PollOutcome, GateError>) -> io::Result<i32> {
        match result {
            Ok(_) => {
                self.emit(GateStatus::Success)?;
                Ok(0)
            }
            Err(err) => {
                self.emit(GateStatus::Failure)?;
                Ok(err.exit_code())
            }
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SourceKind;
    use std::time::Duration;

    fn written(reporter: ResultReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_output_line_format() {
        assert_eq!(
            output_line(GateStatus::Success),
            "::set-output name=status::success"
        );
        assert_eq!(
            output_line(GateStatus::Failure),
            "::set-output name=status::failure"
        );
    }

    #[test]
    fn test_report_success_writes_single_line() {
        let mut reporter = ResultReporter::new(Vec::new());
        let code = reporter
            .report(&Ok(PollOutcome {
                rounds: 2,
                elapsed: Duration::from_secs(10),
            }))
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(written(reporter), "::set-output name=status::success\n");
    }

    #[test]
    fn test_report_failure_is_nonzero() {
        let mut reporter = ResultReporter::new(Vec::new());
        let code = reporter
            .report(&Err(GateError::fetch(SourceKind::Status, "401 Unauthorized")))
            .unwrap();
        assert_ne!(code, 0);
        assert_eq!(written(reporter), "::set-output name=status::failure\n");
    }

    #[test]
    fn test_report_config_error_uses_config_exit_code() {
        let mut reporter = ResultReporter::new(Vec::new());
        let code = reporter
            .report(&Err(GateError::Config("missing token".to_string())))
            .unwrap();
        assert_eq!(code, 2);
    }
}
