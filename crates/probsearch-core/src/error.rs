//! Error types for estimation operations

use thiserror::Error;

/// Errors raised by the estimation engine
///
/// Numerical degeneracy (a non-positive scale, an empty history) is never an
/// error: it is folded into the objective as zero probability. Only contract
/// violations by the caller surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// A configuration value is out of its valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A quadrature region has zero or negative extent, or non-finite bounds
    #[error(
        "Degenerate quadrature region: x in [{x_min}, {x_max}], y in [{y_min}, {y_max}]"
    )]
    DegenerateRegion {
        /// Lower x bound
        x_min: f64,
        /// Upper x bound
        x_max: f64,
        /// Lower y bound
        y_min: f64,
        /// Upper y bound
        y_max: f64,
    },

    /// A one-dimensional quadrature interval has zero or negative length
    #[error("Degenerate quadrature interval: [{min}, {max}]")]
    DegenerateInterval {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// A comparison test was recorded with a NaN or infinite probe
    #[error("Probe value must be finite, got {0}")]
    NonFiniteProbe(f64),
}

/// Errors raised while driving an estimator from a [`crate::TestSource`]
#[derive(Error, Debug)]
pub enum RunError<E> {
    /// The test source failed to produce the next observation
    #[error("Test source error: {0}")]
    Source(E),

    /// The estimator rejected the observation or its configuration
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}
