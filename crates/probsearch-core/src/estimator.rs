//! Sequential estimation driver
//!
//! One step: record a test, seed a hill climb from the history, climb to the
//! MAP point, optionally integrate the likelihood around it, and keep the
//! result as the prior for the next step.

use crate::distribution::CandidateDistribution;
use crate::error::{EstimateError, RunError};
use crate::hill_climb::{hill_climb, ClimbConfig, ClimbResult};
use crate::likelihood::{likelihood, ObjectiveScale};
use crate::observation::{Outcome, Test, TestHistory};
use crate::quadrature::{
    integrate_1d, integrate_2d, Integration, Integration1d, IntegrationConfig, Interval, Rect,
};
use crate::traits::TestSource;
use serde::{Deserialize, Serialize};

/// How the emitted posterior is derived from the likelihood surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PosteriorMode {
    /// The MAP point itself
    #[default]
    Map,
    /// Mass-normalized moments of a 2D integration around the MAP point
    Integrated,
    /// MAP mean with the scale from a 1D integration at that mean
    IntegratedStdDev,
}

impl PosteriorMode {
    /// Name used in configuration and output
    pub fn as_str(&self) -> &'static str {
        match self {
            PosteriorMode::Map => "map",
            PosteriorMode::Integrated => "integrated",
            PosteriorMode::IntegratedStdDev => "integrated-std-dev",
        }
    }
}

/// Where the climb starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Symmetric bounds (±) used until both outcomes have been observed
    pub fallback_bound: f64,

    /// Lower limit on the starting scale
    pub min_start_std_dev: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            fallback_bound: 2.0,
            min_start_std_dev: 0.3,
        }
    }
}

/// Integration region relative to the MAP point `(m*, s*)`
///
/// Mean spans `m* ± max(mean_half_width, mean_half_width_scale · s*)`; scale
/// spans `[s* · std_dev_min_factor, s* · std_dev_max_factor]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Smallest half-width of the mean range
    pub mean_half_width: f64,
    /// Half-width of the mean range as a multiple of the MAP scale, when wider
    pub mean_half_width_scale: f64,
    /// Lower scale bound as a multiple of the MAP scale
    pub std_dev_min_factor: f64,
    /// Upper scale bound as a multiple of the MAP scale
    pub std_dev_max_factor: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            mean_half_width: 10.0,
            mean_half_width_scale: 10.0,
            std_dev_min_factor: 0.01,
            std_dev_max_factor: 10.0,
        }
    }
}

impl RegionConfig {
    /// Rectangle around the MAP point `(mean, std_dev)`
    ///
    /// # Errors
    /// [`EstimateError::DegenerateRegion`] when rounding collapses the region,
    /// e.g. a half-width below the spacing of floats at `mean`.
    pub fn around(&self, mean: f64, std_dev: f64) -> Result<Rect, EstimateError> {
        let half_width = self.mean_half_width.max(self.mean_half_width_scale * std_dev);
        Rect::new(
            mean - half_width,
            mean + half_width,
            std_dev * self.std_dev_min_factor,
            std_dev * self.std_dev_max_factor,
        )
    }

    /// Scale range around the MAP scale
    pub fn std_dev_interval(&self, std_dev: f64) -> Result<Interval, EstimateError> {
        Interval::new(std_dev * self.std_dev_min_factor, std_dev * self.std_dev_max_factor)
    }
}

/// Configuration for [`Estimator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Belief before any test is observed
    pub initial_prior: CandidateDistribution,
    /// How posteriors are derived
    pub mode: PosteriorMode,
    /// Objective form climbed by the MAP search
    pub objective: ObjectiveScale,
    /// Climb starting point policy
    pub seed: SeedConfig,
    /// Hill climb settings
    pub climb: ClimbConfig,
    /// Integration region settings
    pub region: RegionConfig,
    /// Quadrature settings
    pub integration: IntegrationConfig,
    /// Integrate the likelihood divided by its MAP value
    ///
    /// The smoothness test is absolute, so when the peak likelihood is below
    /// the tolerance every cell passes at depth 0 and the posterior is the
    /// corner-rule centroid of the whole region. Dividing by the peak scales
    /// every value alike and makes the tolerance relative to it.
    pub normalize_to_peak: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            initial_prior: CandidateDistribution::default(),
            mode: PosteriorMode::Map,
            objective: ObjectiveScale::Probability,
            seed: SeedConfig::default(),
            climb: ClimbConfig::default(),
            region: RegionConfig::default(),
            integration: IntegrationConfig::default(),
            normalize_to_peak: false,
        }
    }
}

impl EstimatorConfig {
    /// Integrated posteriors with a finer climb and deeper quadrature
    pub fn precise() -> Self {
        let mut config = Self {
            mode: PosteriorMode::Integrated,
            ..Self::default()
        };
        config.climb.min_step = 1e-4;
        config.integration.tolerance_2d = 0.02;
        config.integration.max_depth = 14;
        config
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), EstimateError> {
        self.climb.validate()?;
        self.integration.validate()?;

        let prior = &self.initial_prior;
        if !prior.mean.is_finite() || !prior.std_dev.is_finite() {
            return Err(EstimateError::InvalidConfig(format!(
                "initial_prior must be finite, got {}",
                prior
            )));
        }
        if !(self.seed.fallback_bound.is_finite() && self.seed.fallback_bound > 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "seed.fallback_bound must be finite and positive, got {}",
                self.seed.fallback_bound
            )));
        }
        if !(self.seed.min_start_std_dev.is_finite() && self.seed.min_start_std_dev > 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "seed.min_start_std_dev must be finite and positive, got {}",
                self.seed.min_start_std_dev
            )));
        }
        if !(self.region.mean_half_width.is_finite() && self.region.mean_half_width > 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "region.mean_half_width must be finite and positive, got {}",
                self.region.mean_half_width
            )));
        }
        let scale = self.region.mean_half_width_scale;
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "region.mean_half_width_scale must be finite and non-negative, got {}",
                scale
            )));
        }
        let (lo, hi) = (self.region.std_dev_min_factor, self.region.std_dev_max_factor);
        if !(lo > 0.0 && hi.is_finite() && hi > lo) {
            return Err(EstimateError::InvalidConfig(format!(
                "region scale factors must satisfy 0 < min < max, got [{}, {}]",
                lo, hi
            )));
        }
        Ok(())
    }
}

/// Integration that produced a posterior, if any
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PosteriorIntegration {
    /// Joint integration over mean and scale
    Joint(Integration),
    /// Integration over scale at the MAP mean
    StdDev(Integration1d),
}

impl PosteriorIntegration {
    /// Probability mass used for normalization
    pub fn mass(&self) -> f64 {
        match self {
            PosteriorIntegration::Joint(i) => i.mass,
            PosteriorIntegration::StdDev(i) => i.mass,
        }
    }

    /// Whether the integrator converged everywhere
    pub fn converged(&self) -> bool {
        match self {
            PosteriorIntegration::Joint(i) => i.converged,
            PosteriorIntegration::StdDev(i) => i.converged,
        }
    }
}

/// Everything computed for one history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Starting point of the climb
    pub seed: CandidateDistribution,
    /// Hill climb result (the MAP point)
    pub map: ClimbResult,
    /// Emitted posterior
    pub posterior: CandidateDistribution,
    /// Integration record on integrated modes
    pub integration: Option<PosteriorIntegration>,
}

/// One observed step of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based position in the history
    pub step: usize,
    /// The test observed at this step
    pub test: Test,
    /// Belief before the test
    pub prior: CandidateDistribution,
    /// Result of the step
    pub estimate: Estimate,
}

impl StepRecord {
    /// Belief after the test
    pub fn posterior(&self) -> CandidateDistribution {
        self.estimate.posterior
    }
}

/// Posteriors emitted by a run, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Recorded steps
    pub steps: Vec<StepRecord>,
}

impl Trajectory {
    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step was recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Posterior after the last step
    pub fn final_posterior(&self) -> Option<CandidateDistribution> {
        self.steps.last().map(StepRecord::posterior)
    }

    /// Posterior means, step by step
    pub fn means(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.posterior().mean).collect()
    }
}

/// Starting point for the climb derived from the history
///
/// Midpoint of the mean `Greater` probe and the mean `Less` probe, with a
/// quarter of their distance as scale. Until both outcomes have been seen
/// the bounds are `±fallback_bound`.
pub fn seed_point(history: &TestHistory, seed: &SeedConfig) -> CandidateDistribution {
    let (lower, upper) = match (
        history.mean_probe(Outcome::Less),
        history.mean_probe(Outcome::Greater),
    ) {
        (Some(less), Some(greater)) => (less, greater),
        _ => (-seed.fallback_bound, seed.fallback_bound),
    };

    let mean = (lower + upper) / 2.0;
    let std_dev = ((upper - lower).abs() / 4.0).max(seed.min_start_std_dev);
    CandidateDistribution::new(mean, std_dev)
}

/// Compute the posterior for `history` under `config`
///
/// The config is assumed valid; [`Estimator::new`] checks it once.
pub fn compute_posterior(
    history: &TestHistory,
    config: &EstimatorConfig,
) -> Result<Estimate, EstimateError> {
    let seed = seed_point(history, &config.seed);
    let scale = config.objective;
    let climb = config.climb.scaled_to(seed.std_dev);
    let map = hill_climb(seed.mean, seed.std_dev, &climb, |m, s| {
        scale.evaluate(history, m, s)
    })?;
    let map_point = CandidateDistribution::new(map.x, map.y);

    let (posterior, integration) = match config.mode {
        PosteriorMode::Map => (map_point, None),
        _ if map_point.is_degenerate() => {
            tracing::warn!("MAP scale {} is not positive, skipping integration", map.y);
            (map_point, None)
        }
        PosteriorMode::Integrated => integrate_joint(history, config, map_point)?,
        PosteriorMode::IntegratedStdDev => integrate_std_dev(history, config, map_point)?,
    };

    Ok(Estimate {
        seed,
        map,
        posterior,
        integration,
    })
}

type Derived = (CandidateDistribution, Option<PosteriorIntegration>);

/// Likelihood integrand, divided by its MAP value under `normalize_to_peak`
fn integrand<'h>(
    history: &'h TestHistory,
    config: &EstimatorConfig,
    map: &CandidateDistribution,
) -> impl Fn(f64, f64) -> f64 + Sync + 'h {
    let peak = if config.normalize_to_peak {
        likelihood(history, map.mean, map.std_dev)
    } else {
        1.0
    };
    let norm = if peak > 0.0 && peak.is_finite() { peak } else { 1.0 };
    move |m: f64, s: f64| likelihood(history, m, s) / norm
}

fn integrate_joint(
    history: &TestHistory,
    config: &EstimatorConfig,
    map: CandidateDistribution,
) -> Result<Derived, EstimateError> {
    let rect = match config.region.around(map.mean, map.std_dev) {
        Ok(rect) => rect,
        Err(e) => {
            tracing::warn!("Integration region collapsed ({}), keeping the MAP point", e);
            return Ok((map, None));
        }
    };

    let objective = integrand(history, config, &map);
    let result = integrate_2d(&rect, (map.mean, map.std_dev), &config.integration, objective)?;
    let posterior = match result.centroid() {
        Some((mean, std_dev)) => CandidateDistribution::new(mean, std_dev),
        None => {
            tracing::warn!("Integrated posterior mass is zero, falling back to the MAP point");
            map
        }
    };
    Ok((posterior, Some(PosteriorIntegration::Joint(result))))
}

fn integrate_std_dev(
    history: &TestHistory,
    config: &EstimatorConfig,
    map: CandidateDistribution,
) -> Result<Derived, EstimateError> {
    let interval = match config.region.std_dev_interval(map.std_dev) {
        Ok(interval) => interval,
        Err(e) => {
            tracing::warn!("Scale interval collapsed ({}), keeping the MAP point", e);
            return Ok((map, None));
        }
    };

    let objective = integrand(history, config, &map);
    let result = integrate_1d(&interval, map.std_dev, &config.integration, |s| {
        objective(map.mean, s)
    })?;
    let posterior = match result.centroid() {
        Some(std_dev) => CandidateDistribution::new(map.mean, std_dev),
        None => {
            tracing::warn!("Integrated scale mass is zero, falling back to the MAP point");
            map
        }
    };
    Ok((posterior, Some(PosteriorIntegration::StdDev(result))))
}

/// Sequential estimator: owns the test history and the current belief
///
/// # Examples
///
/// ```
/// use probsearch_core::{Estimator, EstimatorConfig, Test};
///
/// # fn main() -> Result<(), probsearch_core::EstimateError> {
/// let mut estimator = Estimator::new(EstimatorConfig::default())?;
/// estimator.observe(Test::greater(3.0))?;
/// let step = estimator.observe(Test::less(10.0))?;
///
/// let posterior = step.posterior();
/// assert!(posterior.mean > 3.0 && posterior.mean < 10.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Estimator {
    config: EstimatorConfig,
    history: TestHistory,
    posterior: CandidateDistribution,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            config: EstimatorConfig::default(),
            history: TestHistory::new(),
            posterior: CandidateDistribution::default(),
        }
    }
}

impl Estimator {
    /// Create an estimator, validating `config`
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimateError> {
        config.validate()?;
        let posterior = config.initial_prior;
        Ok(Self {
            config,
            history: TestHistory::new(),
            posterior,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Tests observed so far
    pub fn history(&self) -> &TestHistory {
        &self.history
    }

    /// Current belief (the prior for the next test)
    pub fn posterior(&self) -> CandidateDistribution {
        self.posterior
    }

    /// Record `test` and update the belief
    ///
    /// The test stays in the history even if the update fails; the belief is
    /// only replaced on success.
    pub fn observe(&mut self, test: Test) -> Result<StepRecord, EstimateError> {
        self.history.push(test)?;
        let prior = self.posterior;
        let estimate = compute_posterior(&self.history, &self.config)?;
        self.posterior = estimate.posterior;

        tracing::debug!(
            "Step {}: {} -> {} (MAP ({}, {}), {} climb evaluations)",
            self.history.len(),
            test,
            estimate.posterior,
            estimate.map.x,
            estimate.map.y,
            estimate.map.evaluations
        );

        Ok(StepRecord {
            step: self.history.len(),
            test,
            prior,
            estimate,
        })
    }

    /// Posterior for the current history without recording anything
    pub fn estimate(&self) -> Result<Estimate, EstimateError> {
        compute_posterior(&self.history, &self.config)
    }

    /// Draw up to `steps` tests from `source`, observing each
    ///
    /// Stops early when the source is exhausted.
    pub fn run<S: TestSource>(
        &mut self,
        source: &mut S,
        steps: usize,
    ) -> Result<Trajectory, RunError<S::Error>> {
        let mut trajectory = Trajectory::default();

        for _ in 0..steps {
            let Some(test) = source.next_test(&self.posterior).map_err(RunError::Source)? else {
                tracing::debug!("Test source exhausted after {} steps", trajectory.len());
                break;
            };
            trajectory.steps.push(self.observe(test)?);
        }

        tracing::info!(
            "Run finished: {} steps, posterior {}",
            trajectory.len(),
            self.posterior
        );
        Ok(trajectory)
    }

    /// Start a new run from the initial prior
    ///
    /// The recorded history is replaced by an empty one, never edited.
    pub fn reset(&mut self) {
        self.history = TestHistory::new();
        self.posterior = self.config.initial_prior;
    }
}
