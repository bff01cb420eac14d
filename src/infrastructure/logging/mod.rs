//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or human-readable events on stderr
//! - Optional rolling JSON log files
//! - Secret scrubbing for error text

pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use config::{LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;
