//! # DRIFT IO
//!
//! Persistence layer for the DRIFT benchmark.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - Validated JSON helpers
//! - The drift config document (models and links)
//! - Run reports

/// Error types and result aliases for I/O operations
pub mod error;
/// Drift config documents holding model definitions and links
pub mod drift_config;
/// Run reports written after a benchmark
pub mod report;
/// Validated serialization helpers for JSON
pub mod serialization;

pub use drift_config::DriftConfig;
pub use error::{IoError, Result};
pub use report::{Comparison, FailureRecord, RunReport};
pub use serialization::{
    from_json, read_json_file, to_json, to_json_pretty, validate_json, write_json_file,
};
