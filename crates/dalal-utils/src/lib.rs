//! Shared utilities for dalal-rs
//!
//! Logging setup and small environment helpers used by the binaries.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with};
