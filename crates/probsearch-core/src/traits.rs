//! Trait definitions for external interactions
//!
//! The estimator does not decide where comparison tests come from. A live
//! oracle, a recorded log, or an interactive user all plug in here.

use crate::{CandidateDistribution, Test};
use std::convert::Infallible;

/// Source of comparison tests for [`crate::Estimator::run`]
///
/// Recorded logs replay through [`ReplaySource`]; [`crate::OracleSource`]
/// picks its own probes and asks a comparison oracle. Closures work too.
pub trait TestSource {
    /// Error type for source operations
    type Error;

    /// Produce the next test given the current belief, or `None` when exhausted
    ///
    /// `prior` is the posterior of the previous step, available for choosing
    /// where to probe next.
    fn next_test(&mut self, prior: &CandidateDistribution) -> Result<Option<Test>, Self::Error>;
}

impl<F, E> TestSource for F
where
    F: FnMut(&CandidateDistribution) -> Result<Option<Test>, E>,
{
    type Error = E;

    fn next_test(&mut self, prior: &CandidateDistribution) -> Result<Option<Test>, Self::Error> {
        self(prior)
    }
}

/// Replays a fixed, recorded sequence of tests
#[derive(Debug, Clone)]
pub struct ReplaySource {
    tests: std::vec::IntoIter<Test>,
}

impl ReplaySource {
    /// Create a replay over `tests` in order
    pub fn new(tests: Vec<Test>) -> Self {
        Self {
            tests: tests.into_iter(),
        }
    }

    /// Tests not yet handed out
    pub fn remaining(&self) -> usize {
        self.tests.len()
    }
}

impl From<Vec<Test>> for ReplaySource {
    fn from(tests: Vec<Test>) -> Self {
        Self::new(tests)
    }
}

impl TestSource for ReplaySource {
    type Error = Infallible;

    fn next_test(&mut self, _prior: &CandidateDistribution) -> Result<Option<Test>, Self::Error> {
        Ok(self.tests.next())
    }
}
