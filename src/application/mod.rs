//! Application layer
//!
//! Use-case orchestration over the domain:
//! - Filtering and aggregation of check entries
//! - The convergence loop that polls sources until every check succeeds
//! - Reporting the outcome to the invoking pipeline

pub mod aggregator;
pub mod convergence_loop;
pub mod reporter;

pub use convergence_loop::ConvergenceLoop;
pub use reporter::{GateStatus, ResultReporter};
