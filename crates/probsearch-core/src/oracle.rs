//! Oracle-driven test source
//!
//! Here the estimator chooses its own probes: each one is sampled around the
//! current belief, and an oracle reports how the hidden value compares.

use crate::distribution::CandidateDistribution;
use crate::observation::{Outcome, Test};
use crate::traits::TestSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};

/// Default amount added to the belief's scale when sampling probes
pub const DEFAULT_PROBE_SPREAD: f64 = 1.0;

/// Sample a probe from `N(belief.mean, belief.std_dev + spread)`
///
/// A non-positive belief scale counts as zero, so probes still spread by
/// `spread` around the mean once the belief has collapsed.
///
/// # Errors
/// [`NormalError`] if the resulting scale is negative or NaN.
pub fn sample_probe<R: Rng + ?Sized>(
    belief: &CandidateDistribution,
    spread: f64,
    rng: &mut R,
) -> Result<f64, NormalError> {
    let normal = Normal::new(belief.mean, belief.std_dev.max(0.0) + spread)?;
    Ok(normal.sample(rng))
}

/// [`TestSource`] that samples each probe around the current belief and asks
/// `oracle` for the outcome
///
/// `oracle(probe)` returns `true` when the hidden value is greater than the
/// probe. The source never runs dry; [`crate::Estimator::run`]'s step limit
/// ends the search.
///
/// # Examples
///
/// ```
/// use probsearch_core::{Estimator, EstimatorConfig, OracleSource};
///
/// let target = 7.3;
/// let mut source = OracleSource::seeded(|probe: f64| target > probe, 42);
/// let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
///
/// let trajectory = estimator.run(&mut source, 20).unwrap();
/// assert_eq!(trajectory.len(), 20);
/// ```
pub struct OracleSource<F, R = StdRng> {
    oracle: F,
    rng: R,
    spread: f64,
}

impl<F> OracleSource<F, StdRng>
where
    F: FnMut(f64) -> bool,
{
    /// Source with a seeded generator; the same seed replays the same probes
    pub fn seeded(oracle: F, seed: u64) -> Self {
        Self::with_rng(oracle, StdRng::seed_from_u64(seed))
    }

    /// Source seeded from system entropy
    pub fn from_entropy(oracle: F) -> Self {
        Self::with_rng(oracle, StdRng::from_entropy())
    }
}

impl<F, R> OracleSource<F, R>
where
    F: FnMut(f64) -> bool,
    R: Rng,
{
    /// Source drawing probes from `rng`
    pub fn with_rng(oracle: F, rng: R) -> Self {
        Self {
            oracle,
            rng,
            spread: DEFAULT_PROBE_SPREAD,
        }
    }

    /// Set the amount added to the belief's scale when sampling
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }
}

impl<F, R> TestSource for OracleSource<F, R>
where
    F: FnMut(f64) -> bool,
    R: Rng,
{
    type Error = NormalError;

    fn next_test(&mut self, prior: &CandidateDistribution) -> Result<Option<Test>, Self::Error> {
        let probe = sample_probe(prior, self.spread, &mut self.rng)?;
        let outcome = if (self.oracle)(probe) {
            Outcome::Greater
        } else {
            Outcome::Less
        };
        tracing::trace!("Oracle answered {} for probe {}", outcome, probe);
        Ok(Some(Test::new(probe, outcome)))
    }
}
