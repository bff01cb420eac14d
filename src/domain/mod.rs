//! Domain layer for the commit gate
//!
//! This module contains the check model, configuration model, errors and
//! the port every check source implements.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{GateError, GateResult};
