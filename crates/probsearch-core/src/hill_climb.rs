//! Coordinate-ascent hill climb over a two-dimensional objective
//!
//! The climb walks one axis at a time in steps of `d`, moving while a
//! neighbor improves on the current value, and halves `d` after a full pass
//! that made no progress. It stops once `d < min_step`, or early when the
//! evaluation budget runs out. This is a local search: it finds a nearby
//! maximum, not the global one.

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};

/// Default starting step size
pub const DEFAULT_INITIAL_STEP: f64 = 0.1;

/// Default minimum step size; the climb ends below it
pub const DEFAULT_MIN_STEP: f64 = 0.001;

/// Default cap on consecutive moves along one axis at one step size
pub const DEFAULT_MAX_MOVES_PER_AXIS: usize = 100_000;

/// Default cap on objective evaluations per climb
pub const DEFAULT_MAX_EVALUATIONS: usize = 1_000_000;

/// Default starting step as a fraction of the starting scale
pub const DEFAULT_RELATIVE_INITIAL_STEP: f64 = 0.025;

/// How a neighbor that only equals the current value is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Only strictly better neighbors are moved to
    #[default]
    Strict,

    /// Equal neighbors are moved to as well, but only strict gains count as
    /// progress, so a plateau still ends in step halving
    NonStrict,
}

/// Configuration for [`hill_climb`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    /// Step size of the first pass
    pub initial_step: f64,

    /// The climb terminates once the step falls below this
    pub min_step: f64,

    /// Neighbor comparison policy
    pub tie_break: TieBreak,

    /// Maximum consecutive moves along one axis before the sweep of that axis ends
    pub max_moves_per_axis: usize,

    /// Objective evaluation budget for the whole climb (`None` = unlimited)
    pub max_evaluations: Option<usize>,

    /// Starting step as a fraction of the starting scale; see [`ClimbConfig::scaled_to`]
    pub relative_initial_step: f64,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            initial_step: DEFAULT_INITIAL_STEP,
            min_step: DEFAULT_MIN_STEP,
            tie_break: TieBreak::Strict,
            max_moves_per_axis: DEFAULT_MAX_MOVES_PER_AXIS,
            max_evaluations: Some(DEFAULT_MAX_EVALUATIONS),
            relative_initial_step: DEFAULT_RELATIVE_INITIAL_STEP,
        }
    }
}

impl ClimbConfig {
    /// Check that the step schedule can terminate
    pub fn validate(&self) -> Result<(), EstimateError> {
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "initial_step must be finite and positive, got {}",
                self.initial_step
            )));
        }
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "min_step must be finite and positive, got {}",
                self.min_step
            )));
        }
        if self.max_moves_per_axis == 0 {
            return Err(EstimateError::InvalidConfig(
                "max_moves_per_axis must be at least 1".to_string(),
            ));
        }
        if let Some(budget) = self.max_evaluations {
            if budget < 3 {
                return Err(EstimateError::InvalidConfig(format!(
                    "max_evaluations must allow one neighbor pair (3), got {}",
                    budget
                )));
            }
        }
        if !(self.relative_initial_step.is_finite() && self.relative_initial_step >= 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "relative_initial_step must be finite and non-negative, got {}",
                self.relative_initial_step
            )));
        }
        Ok(())
    }

    /// Copy of this config whose first step grows with `scale`
    ///
    /// The first step becomes `max(initial_step, relative_initial_step · |scale|)`,
    /// so a climb started on a wide bracket does not crawl across it in
    /// fixed small steps.
    pub fn scaled_to(&self, scale: f64) -> ClimbConfig {
        let relative = self.relative_initial_step * scale.abs();
        ClimbConfig {
            initial_step: if relative.is_finite() {
                self.initial_step.max(relative)
            } else {
                self.initial_step
            },
            ..self.clone()
        }
    }
}

/// Final state of a climb
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimbResult {
    /// First coordinate of the local maximum
    pub x: f64,
    /// Second coordinate of the local maximum
    pub y: f64,
    /// Objective value at `(x, y)`
    pub value: f64,
    /// Step size when the climb stopped (below `min_step`)
    pub final_step: f64,
    /// Number of objective evaluations
    pub evaluations: usize,
    /// Number of times the step was halved
    pub halvings: usize,
    /// False if the evaluation budget ended the climb before `min_step` was reached
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Mutable working state of the climb
struct SearchState<'f, F> {
    x: f64,
    y: f64,
    z: f64,
    step: f64,
    evaluations: usize,
    objective: &'f F,
}

impl<F> SearchState<'_, F>
where
    F: Fn(f64, f64) -> f64,
{
    /// Whether another neighbor pair would exceed the budget
    fn exhausted(&self, config: &ClimbConfig) -> bool {
        config
            .max_evaluations
            .is_some_and(|budget| self.evaluations + 2 > budget)
    }

    fn eval(&mut self, x: f64, y: f64) -> f64 {
        self.evaluations += 1;
        (self.objective)(x, y)
    }

    fn neighbors(&mut self, axis: Axis) -> (f64, f64) {
        let (x, y, d) = (self.x, self.y, self.step);
        match axis {
            Axis::X => (self.eval(x - d, y), self.eval(x + d, y)),
            Axis::Y => (self.eval(x, y - d), self.eval(x, y + d)),
        }
    }

    fn shift(&mut self, axis: Axis, delta: f64, value: f64) {
        match axis {
            Axis::X => self.x += delta,
            Axis::Y => self.y += delta,
        }
        self.z = value;
    }

    /// Walk along one axis until no neighbor qualifies; returns whether the
    /// objective strictly improved
    fn sweep(&mut self, axis: Axis, config: &ClimbConfig) -> bool {
        let mut improved = false;

        for _ in 0..config.max_moves_per_axis {
            if self.exhausted(config) {
                return improved;
            }
            let (minus, plus) = self.neighbors(axis);
            let d = self.step;
            let z = self.z;

            let chosen = match config.tie_break {
                TieBreak::Strict => {
                    if plus > z && (minus <= z || plus > minus) {
                        Some((d, plus))
                    } else if minus > z {
                        Some((-d, minus))
                    } else {
                        None
                    }
                }
                TieBreak::NonStrict => {
                    if plus >= z && plus >= minus {
                        Some((d, plus))
                    } else if minus >= z {
                        Some((-d, minus))
                    } else {
                        None
                    }
                }
            };

            match chosen {
                Some((delta, value)) => {
                    improved |= value > z;
                    self.shift(axis, delta, value);
                }
                None => return improved,
            }
        }

        tracing::trace!(
            "Axis {:?} sweep hit the move cap ({}) at step {}",
            axis,
            config.max_moves_per_axis,
            self.step
        );
        improved
    }
}

/// Climb `objective` from `(x0, y0)` to a local maximum
///
/// # Arguments
/// * `x0`, `y0` - Starting point
/// * `config` - Step schedule and tie-break policy
/// * `objective` - Function to maximize; non-finite or zero values are just low scores
///
/// If `max_evaluations` runs out first, the best point so far is returned
/// with `converged = false`.
///
/// # Errors
/// Returns [`EstimateError::InvalidConfig`] if the step schedule is not
/// strictly positive and finite.
pub fn hill_climb<F>(
    x0: f64,
    y0: f64,
    config: &ClimbConfig,
    objective: F,
) -> Result<ClimbResult, EstimateError>
where
    F: Fn(f64, f64) -> f64,
{
    config.validate()?;

    let mut state = SearchState {
        x: x0,
        y: y0,
        z: 0.0,
        step: config.initial_step,
        evaluations: 0,
        objective: &objective,
    };
    state.z = state.eval(x0, y0);

    let mut halvings = 0;
    let mut converged = true;
    while state.step >= config.min_step {
        if state.exhausted(config) {
            converged = false;
            tracing::warn!(
                "Hill climb stopped after {} evaluations at ({}, {}) with step {}",
                state.evaluations,
                state.x,
                state.y,
                state.step
            );
            break;
        }

        let moved_x = state.sweep(Axis::X, config);
        let moved_y = state.sweep(Axis::Y, config);

        if !(moved_x || moved_y) {
            state.step /= 2.0;
            halvings += 1;
            tracing::trace!(
                "No improvement at ({}, {}), step halved to {}",
                state.x,
                state.y,
                state.step
            );
        }
    }

    Ok(ClimbResult {
        x: state.x,
        y: state.y,
        value: state.z,
        final_step: state.step,
        evaluations: state.evaluations,
        halvings,
        converged,
    })
}
