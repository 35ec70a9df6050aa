//! Error types for the coupling core.
//!
//! Both kinds are fatal: configuration errors abort before the first tick,
//! execution errors abort the running configuration without a partial result.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriftError {
    /// Invalid link set, unknown model reference or mismatched widths.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model interface failed to produce output.
    #[error("Execution error: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, DriftError>;

impl DriftError {
    #[must_use]
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    #[must_use]
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::Execution(msg.into())
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
