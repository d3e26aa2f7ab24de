//! Error types for the CLI application.

use probsearch_core::{EstimateError, RunError};
use rand_distr::NormalError;
use std::convert::Infallible;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Estimation error
    #[error("Estimation error: {0}")]
    Estimate(#[from] EstimateError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Probe sampling error
    #[error("Probe sampling error: {0}")]
    Sampling(#[from] NormalError),

    /// Line editor error
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}

impl From<Infallible> for CliError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl<E> From<RunError<E>> for CliError
where
    CliError: From<E>,
{
    fn from(err: RunError<E>) -> Self {
        match err {
            RunError::Source(e) => e.into(),
            RunError::Estimate(e) => CliError::Estimate(e),
        }
    }
}
