//! Adaptive quadrature over rectangles (and intervals)
//!
//! Each cell is tested for smoothness by comparing the objective at an
//! interior point with the bilinear interpolation of the cell's corners. A
//! smooth cell is closed with a corner-weighted rule that is exact for
//! bilinear integrands; a rough cell is split into quadrants around the
//! interior point and each quadrant is integrated around its own midpoint.
//!
//! Recursion is bounded two ways: a maximum depth and an evaluation budget.
//! Cells closed because a bound was hit are counted as unconverged and the
//! result carries `converged = false`.
//!
//! Corner values are shared between a cell and its children: a split costs
//! four edge evaluations plus one interior evaluation per child.

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default smoothness tolerance for rectangles
pub const DEFAULT_TOLERANCE_2D: f64 = 0.05;

/// Default smoothness tolerance for intervals
pub const DEFAULT_TOLERANCE_1D: f64 = 0.01;

/// Default maximum subdivision depth
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// Default cap on objective evaluations per integration
pub const DEFAULT_MAX_EVALUATIONS: usize = 4_000_000;

const SPLIT_COST_2D: usize = 8;
const SPLIT_COST_1D: usize = 2;

/// Configuration for [`integrate_2d`] and [`integrate_1d`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Maximum |actual − bilinear| at the interior point for a rectangle to close
    pub tolerance_2d: f64,

    /// Maximum |actual − linear| at the interior point for an interval to close
    pub tolerance_1d: f64,

    /// Maximum subdivision depth; cells at this depth close regardless
    pub max_depth: usize,

    /// Objective evaluation budget (`None` = unlimited)
    pub max_evaluations: Option<usize>,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            tolerance_2d: DEFAULT_TOLERANCE_2D,
            tolerance_1d: DEFAULT_TOLERANCE_1D,
            max_depth: DEFAULT_MAX_DEPTH,
            max_evaluations: Some(DEFAULT_MAX_EVALUATIONS),
        }
    }
}

impl IntegrationConfig {
    /// Check tolerances and budget
    pub fn validate(&self) -> Result<(), EstimateError> {
        let tolerances = [
            ("tolerance_2d", self.tolerance_2d),
            ("tolerance_1d", self.tolerance_1d),
        ];
        for (name, tol) in tolerances {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(EstimateError::InvalidConfig(format!(
                    "{} must be finite and positive, got {}",
                    name, tol
                )));
            }
        }
        if let Some(budget) = self.max_evaluations {
            if budget < 5 {
                return Err(EstimateError::InvalidConfig(format!(
                    "max_evaluations must allow at least one rectangle (5), got {}",
                    budget
                )));
            }
        }
        Ok(())
    }
}

/// Axis-aligned rectangle `[x_min, x_max] × [y_min, y_max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Lower x bound
    pub x_min: f64,
    /// Upper x bound
    pub x_max: f64,
    /// Lower y bound
    pub y_min: f64,
    /// Upper y bound
    pub y_max: f64,
}

impl Rect {
    /// Create a rectangle with positive width and height
    ///
    /// # Errors
    /// [`EstimateError::DegenerateRegion`] for zero-area, inverted, or non-finite bounds.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, EstimateError> {
        let rect = Self { x_min, x_max, y_min, y_max };
        rect.validate()?;
        Ok(rect)
    }

    /// Check that the rectangle has positive, finite extent
    pub fn validate(&self) -> Result<(), EstimateError> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.x_max > self.x_min && self.y_max > self.y_min {
            Ok(())
        } else {
            Err(EstimateError::DegenerateRegion {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            })
        }
    }

    /// Extent along x
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Extent along y
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Width times height
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center of the rectangle
    pub fn midpoint(&self) -> (f64, f64) {
        ((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }

    /// Whether `(x, y)` lies strictly inside (not on an edge)
    pub fn contains_strictly(&self, x: f64, y: f64) -> bool {
        self.x_min < x && x < self.x_max && self.y_min < y && y < self.y_max
    }
}

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Interval {
    /// Create an interval with positive, finite length
    pub fn new(min: f64, max: f64) -> Result<Self, EstimateError> {
        let interval = Self { min, max };
        interval.validate()?;
        Ok(interval)
    }

    /// Check that the interval has positive, finite length
    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.min.is_finite() && self.max.is_finite() && self.max > self.min {
            Ok(())
        } else {
            Err(EstimateError::DegenerateInterval {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Length of the interval
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Center of the interval
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Whether `x` lies strictly inside
    pub fn contains_strictly(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }
}

/// Result of a two-dimensional integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    /// ∫∫ x·f(x, y)
    pub x_moment: f64,
    /// ∫∫ y·f(x, y)
    pub y_moment: f64,
    /// ∫∫ f(x, y)
    pub mass: f64,
    /// False if any cell was closed by the depth limit or the budget
    pub converged: bool,
    /// Deepest subdivision level reached (0 = no split)
    pub max_depth_reached: usize,
    /// Number of cells closed
    pub regions: usize,
    /// Number of cells closed without passing the smoothness test
    pub unconverged_regions: usize,
    /// Number of objective evaluations
    pub evaluations: usize,
}

impl Integration {
    /// Mass-normalized first moments, or `None` when the mass is zero
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.mass != 0.0 && self.mass.is_finite() {
            Some((self.x_moment / self.mass, self.y_moment / self.mass))
        } else {
            None
        }
    }
}

/// Result of a one-dimensional integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Integration1d {
    /// ∫ x·f(x)
    pub moment: f64,
    /// ∫ f(x)
    pub mass: f64,
    /// False if any segment was closed by the depth limit or the budget
    pub converged: bool,
    /// Deepest subdivision level reached
    pub max_depth_reached: usize,
    /// Number of segments closed
    pub regions: usize,
    /// Number of segments closed without passing the smoothness test
    pub unconverged_regions: usize,
    /// Number of objective evaluations
    pub evaluations: usize,
}

impl Integration1d {
    /// Mass-normalized first moment, or `None` when the mass is zero
    pub fn centroid(&self) -> Option<f64> {
        if self.mass != 0.0 && self.mass.is_finite() {
            Some(self.moment / self.mass)
        } else {
            None
        }
    }
}

/// Shared evaluation counter; atomic so quadrant recursions may run on other threads
struct Budget {
    limit: Option<usize>,
    used: AtomicUsize,
}

impl Budget {
    fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Reserve `n` evaluations; false if that would exceed the limit
    fn try_spend(&self, n: usize) -> bool {
        match self.limit {
            None => {
                self.used.fetch_add(n, Ordering::Relaxed);
                true
            }
            Some(limit) => self
                .used
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                    (used + n <= limit).then_some(used + n)
                })
                .is_ok(),
        }
    }

    fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }
}

/// Partial sums over a set of closed cells
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    x: f64,
    y: f64,
    mass: f64,
    regions: usize,
    unconverged: usize,
    depth: usize,
}

impl Tally {
    /// Sum quadrant results in a fixed order so threading cannot change rounding
    fn combine(parts: [Tally; 4]) -> Tally {
        let [a, b, c, d] = parts;
        Tally {
            x: a.x + b.x + c.x + d.x,
            y: a.y + b.y + c.y + d.y,
            mass: a.mass + b.mass + c.mass + d.mass,
            regions: a.regions + b.regions + c.regions + d.regions,
            unconverged: a.unconverged + b.unconverged + c.unconverged + d.unconverged,
            depth: a.depth.max(b.depth).max(c.depth).max(d.depth),
        }
    }
}

/// A rectangle with its corner values and one interior sample
///
/// Corners are ordered (x_min, y_min), (x_max, y_min), (x_max, y_max), (x_min, y_max).
struct Cell {
    rect: Rect,
    corners: [f64; 4],
    cx: f64,
    cy: f64,
    center: f64,
}

impl Cell {
    /// Bilinear interpolation of the corners at the interior point
    fn interpolated_center(&self) -> f64 {
        let [v1, v2, v3, v4] = self.corners;
        let lx = (self.cx - self.rect.x_min) / self.rect.width();
        let ly = (self.cy - self.rect.y_min) / self.rect.height();
        v1 * (1.0 - lx) * (1.0 - ly) + v2 * lx * (1.0 - ly) + v3 * lx * ly + v4 * (1.0 - lx) * ly
    }

    /// Corner-weighted closing rule, exact for bilinear integrands
    fn close(&self, depth: usize, converged: bool) -> Tally {
        let [v1, v2, v3, v4] = self.corners;
        let Rect { x_min, x_max, y_min, y_max } = self.rect;
        let area = self.rect.area();

        Tally {
            x: area / 12.0
                * (x_min * (2.0 * (v1 + v4) + v2 + v3) + x_max * (2.0 * (v2 + v3) + v1 + v4)),
            y: area / 12.0
                * (y_min * (2.0 * (v1 + v2) + v3 + v4) + y_max * (2.0 * (v3 + v4) + v1 + v2)),
            mass: area * (v1 + v2 + v3 + v4) / 4.0,
            regions: 1,
            unconverged: usize::from(!converged),
            depth,
        }
    }

    fn splittable(&self) -> bool {
        self.rect.contains_strictly(self.cx, self.cy)
    }
}

fn child_cell<F>(rect: Rect, corners: [f64; 4], f: &F) -> Cell
where
    F: Fn(f64, f64) -> f64,
{
    let (cx, cy) = rect.midpoint();
    Cell {
        rect,
        corners,
        cx,
        cy,
        center: f(cx, cy),
    }
}

fn integrate_cell<F>(
    cell: Cell,
    depth: usize,
    f: &F,
    config: &IntegrationConfig,
    budget: &Budget,
) -> Tally
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    if (cell.center - cell.interpolated_center()).abs() < config.tolerance_2d {
        return cell.close(depth, true);
    }
    if depth >= config.max_depth || !cell.splittable() || !budget.try_spend(SPLIT_COST_2D) {
        return cell.close(depth, false);
    }

    let Rect { x_min, x_max, y_min, y_max } = cell.rect;
    let (cx, cy, c) = (cell.cx, cell.cy, cell.center);
    let [v1, v2, v3, v4] = cell.corners;

    let bottom = f(cx, y_min);
    let right = f(x_max, cy);
    let top = f(cx, y_max);
    let left = f(x_min, cy);

    let quadrants = [
        child_cell(Rect { x_min, x_max: cx, y_min, y_max: cy }, [v1, bottom, c, left], f),
        child_cell(Rect { x_min: cx, x_max, y_min, y_max: cy }, [bottom, v2, right, c], f),
        child_cell(Rect { x_min, x_max: cx, y_min: cy, y_max }, [left, c, top, v4], f),
        child_cell(Rect { x_min: cx, x_max, y_min: cy, y_max }, [c, right, v3, top], f),
    ];

    Tally::combine(recurse_quadrants(quadrants, depth + 1, f, config, budget))
}

#[cfg(not(feature = "parallel"))]
fn recurse_quadrants<F>(
    quadrants: [Cell; 4],
    depth: usize,
    f: &F,
    config: &IntegrationConfig,
    budget: &Budget,
) -> [Tally; 4]
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    quadrants.map(|q| integrate_cell(q, depth, f, config, budget))
}

#[cfg(feature = "parallel")]
fn recurse_quadrants<F>(
    quadrants: [Cell; 4],
    depth: usize,
    f: &F,
    config: &IntegrationConfig,
    budget: &Budget,
) -> [Tally; 4]
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    let [a, b, c, d] = quadrants;
    let ((a, b), (c, d)) = rayon::join(
        || {
            rayon::join(
                || integrate_cell(a, depth, f, config, budget),
                || integrate_cell(b, depth, f, config, budget),
            )
        },
        || {
            rayon::join(
                || integrate_cell(c, depth, f, config, budget),
                || integrate_cell(d, depth, f, config, budget),
            )
        },
    );
    [a, b, c, d]
}

/// Integrate `f` and its first moments over `rect`
///
/// `center` is the first interior sample, typically the MAP point. If it is
/// not strictly inside `rect` the midpoint is used instead.
///
/// # Errors
/// [`EstimateError::DegenerateRegion`] for a zero-area rectangle,
/// [`EstimateError::InvalidConfig`] for bad tolerances or budget.
pub fn integrate_2d<F>(
    rect: &Rect,
    center: (f64, f64),
    config: &IntegrationConfig,
    f: F,
) -> Result<Integration, EstimateError>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    config.validate()?;
    rect.validate()?;

    let (cx, cy) = if rect.contains_strictly(center.0, center.1) {
        center
    } else {
        tracing::debug!(
            "Interior point ({}, {}) not strictly inside {:?}, using midpoint",
            center.0,
            center.1,
            rect
        );
        rect.midpoint()
    };

    let budget = Budget::new(config.max_evaluations);
    budget.try_spend(5);

    let cell = Cell {
        rect: *rect,
        corners: [
            f(rect.x_min, rect.y_min),
            f(rect.x_max, rect.y_min),
            f(rect.x_max, rect.y_max),
            f(rect.x_min, rect.y_max),
        ],
        cx,
        cy,
        center: f(cx, cy),
    };

    let tally = integrate_cell(cell, 0, &f, config, &budget);

    if tally.unconverged > 0 {
        tracing::warn!(
            "Quadrature left {} of {} cells unconverged (depth {}, {} evaluations)",
            tally.unconverged,
            tally.regions,
            tally.depth,
            budget.used()
        );
    }

    Ok(Integration {
        x_moment: tally.x,
        y_moment: tally.y,
        mass: tally.mass,
        converged: tally.unconverged == 0,
        max_depth_reached: tally.depth,
        regions: tally.regions,
        unconverged_regions: tally.unconverged,
        evaluations: budget.used(),
    })
}

/// An interval with its end values and one interior sample
struct Segment {
    interval: Interval,
    ends: [f64; 2],
    c: f64,
    center: f64,
}

impl Segment {
    fn interpolated_center(&self) -> f64 {
        let [v1, v2] = self.ends;
        let l = (self.c - self.interval.min) / self.interval.length();
        v1 * (1.0 - l) + v2 * l
    }

    fn close(&self, depth: usize, converged: bool) -> Tally {
        let [v1, v2] = self.ends;
        let Interval { min, max } = self.interval;
        let w = self.interval.length();

        Tally {
            x: w / 6.0 * (min * (2.0 * v1 + v2) + max * (v1 + 2.0 * v2)),
            y: 0.0,
            mass: (v1 + v2) / 2.0 * w,
            regions: 1,
            unconverged: usize::from(!converged),
            depth,
        }
    }
}

fn child_segment<F>(interval: Interval, ends: [f64; 2], f: &F) -> Segment
where
    F: Fn(f64) -> f64,
{
    let c = interval.midpoint();
    Segment {
        interval,
        ends,
        c,
        center: f(c),
    }
}

fn integrate_segment<F>(
    seg: Segment,
    depth: usize,
    f: &F,
    config: &IntegrationConfig,
    budget: &Budget,
) -> Tally
where
    F: Fn(f64) -> f64 + Sync,
{
    if (seg.center - seg.interpolated_center()).abs() < config.tolerance_1d {
        return seg.close(depth, true);
    }
    if depth >= config.max_depth
        || !seg.interval.contains_strictly(seg.c)
        || !budget.try_spend(SPLIT_COST_1D)
    {
        return seg.close(depth, false);
    }

    let Interval { min, max } = seg.interval;
    let [v1, v2] = seg.ends;
    let lower = child_segment(Interval { min, max: seg.c }, [v1, seg.center], f);
    let upper = child_segment(Interval { min: seg.c, max }, [seg.center, v2], f);

    #[cfg(feature = "parallel")]
    let (a, b) = rayon::join(
        || integrate_segment(lower, depth + 1, f, config, budget),
        || integrate_segment(upper, depth + 1, f, config, budget),
    );
    #[cfg(not(feature = "parallel"))]
    let (a, b) = (
        integrate_segment(lower, depth + 1, f, config, budget),
        integrate_segment(upper, depth + 1, f, config, budget),
    );

    Tally {
        x: a.x + b.x,
        y: 0.0,
        mass: a.mass + b.mass,
        regions: a.regions + b.regions,
        unconverged: a.unconverged + b.unconverged,
        depth: a.depth.max(b.depth),
    }
}

/// Integrate `f` and its first moment over `interval`
///
/// Same scheme as [`integrate_2d`] with linear interpolation and `tolerance_1d`.
pub fn integrate_1d<F>(
    interval: &Interval,
    center: f64,
    config: &IntegrationConfig,
    f: F,
) -> Result<Integration1d, EstimateError>
where
    F: Fn(f64) -> f64 + Sync,
{
    config.validate()?;
    interval.validate()?;

    let c = if interval.contains_strictly(center) {
        center
    } else {
        interval.midpoint()
    };

    let budget = Budget::new(config.max_evaluations);
    budget.try_spend(3);

    let seg = Segment {
        interval: *interval,
        ends: [f(interval.min), f(interval.max)],
        c,
        center: f(c),
    };

    let tally = integrate_segment(seg, 0, &f, config, &budget);

    if tally.unconverged > 0 {
        tracing::warn!(
            "1D quadrature did not fully converge: {} of {} segments closed early",
            tally.unconverged,
            tally.regions
        );
    }

    Ok(Integration1d {
        moment: tally.x,
        mass: tally.mass,
        converged: tally.unconverged == 0,
        max_depth_reached: tally.depth,
        regions: tally.regions,
        unconverged_regions: tally.unconverged,
        evaluations: budget.used(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ∫ x^k over [a, b]
    fn power_integral(k: i32, a: f64, b: f64) -> f64 {
        (b.powi(k + 1) - a.powi(k + 1)) / f64::from(k + 1)
    }

    #[test]
    fn test_constant_is_exact_without_recursion() {
        let rect = Rect::new(0.0, 2.0, 1.0, 4.0).unwrap();
        let config = IntegrationConfig::default();
        let result = integrate_2d(&rect, rect.midpoint(), &config, |_, _| 0.75).unwrap();

        assert_eq!(result.mass, 0.75 * 6.0);
        assert_eq!(result.regions, 1);
        assert_eq!(result.max_depth_reached, 0);
        assert_eq!(result.evaluations, 5);
        assert!(result.converged);

        let (mx, my) = result.centroid().unwrap();
        assert!((mx - 1.0).abs() < 1e-12);
        assert!((my - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_bilinear_is_exact_at_depth_zero() {
        let f = |x: f64, y: f64| 1.0 + 2.0 * x + 0.5 * y + 0.25 * x * y;
        let (x0, x1, y0, y1) = (0.0, 2.0, 1.0, 3.0);
        let rect = Rect::new(x0, x1, y0, y1).unwrap();

        // Off-center interior point: interpolation must still be exact
        let result = integrate_2d(&rect, (0.5, 2.5), &IntegrationConfig::default(), f).unwrap();
        assert_eq!(result.max_depth_reached, 0);
        assert_eq!(result.regions, 1);

        let ix = |k| power_integral(k, x0, x1);
        let iy = |k| power_integral(k, y0, y1);
        // Moment of x^a y^b times f, term by term
        let separable = |a: i32, b: i32| {
            ix(a) * iy(b) + 2.0 * ix(a + 1) * iy(b) + 0.5 * ix(a) * iy(b + 1)
                + 0.25 * ix(a + 1) * iy(b + 1)
        };
        let mass = separable(0, 0);
        let x_moment = separable(1, 0);
        let y_moment = separable(0, 1);

        assert!((result.mass - mass).abs() < 1e-9, "{} vs {}", result.mass, mass);
        assert!((result.x_moment - x_moment).abs() < 1e-9);
        assert!((result.y_moment - y_moment).abs() < 1e-9);
    }

    #[test]
    fn test_gaussian_bump() {
        let f = |x: f64, y: f64| (-((x - 1.0).powi(2) + (y - 2.0).powi(2)) / 2.0).exp();
        let rect = Rect::new(-5.0, 7.0, -4.0, 8.0).unwrap();
        let result = integrate_2d(&rect, (1.0, 2.0), &IntegrationConfig::default(), f).unwrap();

        assert!(result.converged);
        assert!(result.max_depth_reached > 0);
        let two_pi = 2.0 * std::f64::consts::PI;
        assert!((result.mass - two_pi).abs() / two_pi < 0.1, "mass {}", result.mass);

        let (mx, my) = result.centroid().unwrap();
        assert!((mx - 1.0).abs() < 1e-9);
        assert!((my - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_limit_flags_non_convergence() {
        let spike = |x: f64, y: f64| {
            if (x - 0.3).powi(2) + (y - 0.3).powi(2) < 0.01 {
                1.0
            } else {
                0.0
            }
        };
        let rect = Rect::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let config = IntegrationConfig {
            max_depth: 3,
            max_evaluations: None,
            ..IntegrationConfig::default()
        };
        let result = integrate_2d(&rect, (0.3, 0.3), &config, spike).unwrap();

        assert!(!result.converged);
        assert_eq!(result.max_depth_reached, 3);
        assert!(result.unconverged_regions > 0);
        assert!(result.mass >= 0.0 && result.mass < 1.0);
    }

    #[test]
    fn test_budget_stops_subdivision() {
        let spike = |x: f64, y: f64| if x.abs() < 0.1 && y.abs() < 0.1 { 1.0 } else { 0.0 };
        let rect = Rect::new(-1.0, 1.0, -1.0, 1.0).unwrap();
        let config = IntegrationConfig {
            max_evaluations: Some(5),
            ..IntegrationConfig::default()
        };
        let result = integrate_2d(&rect, (0.0, 0.0), &config, spike).unwrap();

        assert!(!result.converged);
        assert_eq!(result.regions, 1);
        assert_eq!(result.evaluations, 5);
    }

    #[test]
    fn test_degenerate_region_rejected() {
        assert!(matches!(
            Rect::new(1.0, 1.0, 0.0, 1.0),
            Err(EstimateError::DegenerateRegion { .. })
        ));
        assert!(Rect::new(0.0, 1.0, 2.0, 2.0).is_err());
        assert!(Rect::new(0.0, 1.0, 3.0, 2.0).is_err());
        assert!(Rect::new(0.0, f64::INFINITY, 0.0, 1.0).is_err());

        let mut rect = Rect::new(0.0, 1.0, 0.0, 1.0).unwrap();
        rect.x_max = rect.x_min;
        let result = integrate_2d(&rect, (0.0, 0.5), &IntegrationConfig::default(), |_, _| 1.0);
        assert!(matches!(result, Err(EstimateError::DegenerateRegion { .. })));
    }

    #[test]
    fn test_center_on_edge_uses_midpoint() {
        let rect = Rect::new(0.0, 4.0, 0.0, 2.0).unwrap();
        let config = IntegrationConfig::default();
        let result = integrate_2d(&rect, (0.0, 0.0), &config, |x, y| x + y).unwrap();
        assert_eq!(result.regions, 1);
        // ∫∫ (x + y) = 2·8 + 4·2 = 24
        assert!((result.mass - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_integrand_has_no_centroid() {
        let rect = Rect::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let config = IntegrationConfig::default();
        let result = integrate_2d(&rect, rect.midpoint(), &config, |_, _| 0.0).unwrap();
        assert_eq!(result.mass, 0.0);
        assert!(result.centroid().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let rect = Rect::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let config = IntegrationConfig {
            tolerance_2d: 0.0,
            ..IntegrationConfig::default()
        };
        assert!(integrate_2d(&rect, (0.5, 0.5), &config, |_, _| 1.0).is_err());

        let config = IntegrationConfig {
            max_evaluations: Some(4),
            ..IntegrationConfig::default()
        };
        assert!(integrate_2d(&rect, (0.5, 0.5), &config, |_, _| 1.0).is_err());
    }

    #[test]
    fn test_1d_linear_is_exact() {
        let interval = Interval::new(1.0, 3.0).unwrap();
        let config = IntegrationConfig::default();
        let result = integrate_1d(&interval, 1.5, &config, |x| 2.0 * x + 1.0).unwrap();

        assert_eq!(result.regions, 1);
        // ∫ (2x + 1) = 10, ∫ x(2x + 1) = 2·26/3 + 4
        assert!((result.mass - 10.0).abs() < 1e-12);
        assert!((result.moment - (52.0 / 3.0 + 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_1d_refines_curved_integrand() {
        let interval = Interval::new(-6.0, 6.0).unwrap();
        let config = IntegrationConfig::default();
        let gauss = |x: f64| (-x * x / 2.0).exp();
        let result = integrate_1d(&interval, 0.0, &config, gauss).unwrap();

        let expected = (2.0 * std::f64::consts::PI).sqrt();
        assert!(result.converged);
        assert!(result.max_depth_reached > 0);
        assert!((result.mass - expected).abs() / expected < 0.05, "mass {}", result.mass);
        assert!(result.centroid().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_interval_rejected() {
        assert!(matches!(
            Interval::new(2.0, 2.0),
            Err(EstimateError::DegenerateInterval { .. })
        ));
        assert!(Interval::new(f64::NAN, 2.0).is_err());
    }
}
