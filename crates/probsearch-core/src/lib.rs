//! Probabilistic Binary Search Core
//!
//! This crate estimates an unknown real-valued target from noisy comparison
//! tests. Belief about the target is a normal distribution over its location;
//! each test ("the target is greater/less than this probe") updates that
//! belief through a likelihood built on a closed-form normal CDF.
//!
//! ## Key Concepts
//!
//! - **Test**: A probe value and the observed comparison outcome
//! - **Candidate Distribution**: A normal belief `N(mean, std_dev)`
//! - **Likelihood**: Probability of a test history under a candidate
//! - **MAP Point**: Local maximum of the likelihood found by hill climbing
//! - **Integrated Posterior**: Likelihood-weighted moments from adaptive quadrature
//!
//! ## Architecture
//!
//! - Numerical kernels (`distribution`, `likelihood`, `hill_climb`,
//!   `quadrature`) are pure functions over plain values
//! - `estimator` composes them into a sequential driver
//! - Tests come from callers through the `TestSource` trait, or from an
//!   oracle asked about probes sampled around the current belief

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distribution;
pub mod error;
pub mod estimator;
pub mod hill_climb;
pub mod likelihood;
pub mod observation;
pub mod oracle;
pub mod quadrature;
pub mod traits;

// Re-exports for convenience
pub use distribution::{normal_cdf, normal_pdf, normal_sf, CandidateDistribution};
pub use error::{EstimateError, RunError};
pub use estimator::{
    compute_posterior, seed_point, Estimate, Estimator, EstimatorConfig, PosteriorIntegration,
    PosteriorMode, RegionConfig, SeedConfig, StepRecord, Trajectory,
};
pub use hill_climb::{hill_climb, ClimbConfig, ClimbResult, TieBreak};
pub use likelihood::{likelihood, log_likelihood, ObjectiveScale};
pub use observation::{Outcome, Test, TestHistory};
pub use oracle::{sample_probe, OracleSource, DEFAULT_PROBE_SPREAD};
pub use quadrature::{
    integrate_1d, integrate_2d, Integration, Integration1d, IntegrationConfig, Interval, Rect,
};
pub use traits::{ReplaySource, TestSource};
