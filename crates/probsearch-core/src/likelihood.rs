//! Likelihood of a comparison history under a candidate distribution

use crate::distribution::CandidateDistribution;
use crate::observation::{Outcome, TestHistory};
use serde::{Deserialize, Serialize};

/// Joint probability of observing `history` if the target ~ N(mean, std_dev)
///
/// Each `Greater` test contributes `1 − Φ(probe)` and each `Less` test
/// contributes `Φ(probe)`. Returns exactly `0` for `std_dev <= 0` (and NaN),
/// and `1` for an empty history.
pub fn likelihood(history: &TestHistory, mean: f64, std_dev: f64) -> f64 {
    if !(std_dev > 0.0) {
        return 0.0;
    }

    let candidate = CandidateDistribution::new(mean, std_dev);
    let mut p = 1.0;
    for test in history {
        let cdf = candidate.cdf(test.probe());
        match test.outcome() {
            Outcome::Greater => p *= 1.0 - cdf,
            Outcome::Less => p *= cdf,
        }
    }
    p
}

/// Natural log of [`likelihood`], summed per test so long histories do not underflow
///
/// Upper tails come from [`CandidateDistribution::survival`] rather than
/// `1 − Φ`. Degenerate scales give `−∞`.
pub fn log_likelihood(history: &TestHistory, mean: f64, std_dev: f64) -> f64 {
    if !(std_dev > 0.0) {
        return f64::NEG_INFINITY;
    }

    let candidate = CandidateDistribution::new(mean, std_dev);
    history
        .iter()
        .map(|test| match test.outcome() {
            Outcome::Greater => candidate.survival(test.probe()).ln(),
            Outcome::Less => candidate.cdf(test.probe()).ln(),
        })
        .sum()
}

/// Which form of the likelihood the MAP search climbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveScale {
    /// Raw probability product
    #[default]
    Probability,
    /// Sum of log probabilities
    LogProbability,
}

impl ObjectiveScale {
    /// Evaluate the objective at `(mean, std_dev)`
    pub fn evaluate(&self, history: &TestHistory, mean: f64, std_dev: f64) -> f64 {
        match self {
            ObjectiveScale::Probability => likelihood(history, mean, std_dev),
            ObjectiveScale::LogProbability => log_likelihood(history, mean, std_dev),
        }
    }
}
