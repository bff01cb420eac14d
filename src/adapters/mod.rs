//! Adapters that implement domain ports against external services.

pub mod github;
