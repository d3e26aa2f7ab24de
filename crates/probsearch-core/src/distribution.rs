//! Normal distribution with a closed-form CDF approximation
//!
//! The CDF uses the Zelen–Severo rational approximation (Abramowitz & Stegun
//! 26.2.17). Its coefficients are a fixed numerical contract: posteriors are
//! compared bit-for-bit across runs, so this must not be swapped for `erf`.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

const B0: f64 = 0.2316419;
const B1: f64 = 0.319381530;
const B2: f64 = -0.356563782;
const B3: f64 = 1.781477937;
const B4: f64 = -1.821255978;
const B5: f64 = 1.330274429;

/// Standard normal density φ(z)
#[inline]
pub fn normal_pdf(z: f64) -> f64 {
    (-z * z / 2.0).exp() / (2.0 * PI).sqrt()
}

/// Upper tail Q(a) = 1 − Φ(a) for `a >= 0`
#[inline]
fn upper_tail(a: f64) -> f64 {
    let t = 1.0 / (1.0 + B0 * a);
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    normal_pdf(a) * poly
}

/// Approximate Φ((x − mean) / std_dev)
///
/// `std_dev` must be positive; callers guard degenerate scales before calling.
pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    if z > 0.0 {
        1.0 - upper_tail(z)
    } else {
        upper_tail(-z)
    }
}

/// Approximate 1 − Φ((x − mean) / std_dev) without cancellation in the far tail
pub fn normal_sf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    if z > 0.0 {
        upper_tail(z)
    } else {
        1.0 - upper_tail(-z)
    }
}

/// A normal belief about the target: prior or posterior
///
/// `std_dev` is the scale that divides the standardized deviate. A value at or
/// below zero makes the distribution degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateDistribution {
    /// Location
    pub mean: f64,
    /// Scale (standard deviation)
    pub std_dev: f64,
}

impl CandidateDistribution {
    /// Create a new candidate distribution
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Whether the scale is non-positive (or NaN)
    pub fn is_degenerate(&self) -> bool {
        !(self.std_dev > 0.0)
    }

    /// Cumulative probability at `x`
    pub fn cdf(&self, x: f64) -> f64 {
        normal_cdf(x, self.mean, self.std_dev)
    }

    /// Upper tail probability at `x`
    pub fn survival(&self, x: f64) -> f64 {
        normal_sf(x, self.mean, self.std_dev)
    }
}

impl Default for CandidateDistribution {
    fn default() -> Self {
        Self::new(5.0, 5.0)
    }
}

impl fmt::Display for CandidateDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N(mean={}, std_dev={})", self.mean, self.std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_at_mean_is_half() {
        assert!((normal_cdf(5.0, 5.0, 2.0) - 0.5).abs() < 1e-8);
    }

    #[test]
    fn test_cdf_known_values() {
        // Φ(1) = 0.841344746, Φ(-1.96) = 0.024997895
        assert!((normal_cdf(1.0, 0.0, 1.0) - 0.841344746).abs() < 1e-7);
        assert!((normal_cdf(-1.96, 0.0, 1.0) - 0.024997895).abs() < 1e-7);
        assert!((normal_cdf(13.0, 10.0, 1.5) - normal_cdf(2.0, 0.0, 1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_cdf_tails() {
        assert!(normal_cdf(-40.0, 0.0, 1.0) < 1e-300);
        assert_eq!(normal_cdf(40.0, 0.0, 1.0), 1.0);
        assert!(normal_sf(10.0, 0.0, 1.0) > 0.0);
        assert!(normal_sf(10.0, 0.0, 1.0) < 1e-22);
    }

    #[test]
    fn test_survival_mirrors_cdf() {
        let d = CandidateDistribution::new(1.0, 0.5);
        for x in [-3.0, 0.2, 1.7, 4.0] {
            assert!((d.survival(x) + d.cdf(x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pdf_peak() {
        assert!((normal_pdf(0.0) - 0.398_942_280_4).abs() < 1e-9);
        assert_eq!(normal_pdf(1.5), normal_pdf(-1.5));
    }

    #[test]
    fn test_degenerate() {
        assert!(CandidateDistribution::new(0.0, 0.0).is_degenerate());
        assert!(CandidateDistribution::new(0.0, -1.0).is_degenerate());
        assert!(CandidateDistribution::new(0.0, f64::NAN).is_degenerate());
        assert!(!CandidateDistribution::new(0.0, 0.1).is_degenerate());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CandidateDistribution::new(8.0, 0.5).to_string(),
            "N(mean=8, std_dev=0.5)"
        );
    }
}
