//! Port trait definitions (Hexagonal Architecture)
//!
//! - CheckSource: fetches the check entries reported for a commit
//!
//! The convergence loop depends only on this trait, so the number and kind
//! of sources polled each round is a configuration detail.

pub mod check_source;

pub use check_source::CheckSource;
