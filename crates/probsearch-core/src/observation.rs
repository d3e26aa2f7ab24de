//! Observation module - comparison tests and their history

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of comparing a hidden target sample against a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The hidden sample exceeded the probe
    #[serde(alias = "gt", alias = ">")]
    Greater,

    /// The hidden sample did not exceed the probe
    #[serde(alias = "lt", alias = "<")]
    Less,
}

impl Outcome {
    /// Short name used in text input and output
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Greater => "gt",
            Outcome::Less => "lt",
        }
    }

    /// Parse an outcome from text (case-insensitive)
    ///
    /// Accepts `gt`, `greater`, `>`, `+` and `lt`, `less`, `<`, `-`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gt" | "greater" | ">" | "+" => Some(Outcome::Greater),
            "lt" | "less" | "<" | "-" => Some(Outcome::Less),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::parse(s).ok_or_else(|| format!("unknown outcome '{}', expected gt or lt", s))
    }
}

/// A single comparison test: a probe and what the hidden sample did relative to it
///
/// Fields are private so a recorded test cannot be altered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Test {
    probe: f64,
    outcome: Outcome,
}

impl Test {
    /// Create a new test
    pub fn new(probe: f64, outcome: Outcome) -> Self {
        Self { probe, outcome }
    }

    /// Test where the hidden sample exceeded `probe`
    pub fn greater(probe: f64) -> Self {
        Self::new(probe, Outcome::Greater)
    }

    /// Test where the hidden sample did not exceed `probe`
    pub fn less(probe: f64) -> Self {
        Self::new(probe, Outcome::Less)
    }

    /// The probe value
    pub fn probe(&self) -> f64 {
        self.probe
    }

    /// The observed outcome
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.probe, self.outcome)
    }
}

impl FromStr for Test {
    type Err = String;

    /// Parse `probe:outcome`, e.g. `7.5:gt` or `-2:lt`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (probe, outcome) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("invalid test '{}', expected 'probe:outcome'", s))?;
        let probe: f64 = probe
            .trim()
            .parse()
            .map_err(|_| format!("invalid probe value '{}'", probe))?;
        Ok(Test::new(probe, outcome.parse()?))
    }
}

/// Ordered, append-only sequence of tests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestHistory {
    tests: Vec<Test>,
}

impl TestHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from recorded tests, validating each probe
    pub fn from_tests<I: IntoIterator<Item = Test>>(tests: I) -> Result<Self, EstimateError> {
        let mut history = Self::new();
        for test in tests {
            history.push(test)?;
        }
        Ok(history)
    }

    /// Append a test
    ///
    /// # Errors
    /// Returns [`EstimateError::NonFiniteProbe`] for NaN or infinite probes.
    pub fn push(&mut self, test: Test) -> Result<(), EstimateError> {
        if !test.probe.is_finite() {
            return Err(EstimateError::NonFiniteProbe(test.probe));
        }
        self.tests.push(test);
        Ok(())
    }

    /// Recorded tests in observation order
    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    /// Iterate over the recorded tests
    pub fn iter(&self) -> std::slice::Iter<'_, Test> {
        self.tests.iter()
    }

    /// Number of recorded tests
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether no test has been recorded
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Mean probe of the tests with the given outcome, if any
    pub fn mean_probe(&self, outcome: Outcome) -> Option<f64> {
        let (sum, count) = self
            .tests
            .iter()
            .filter(|t| t.outcome == outcome)
            .fold((0.0, 0usize), |(sum, count), t| (sum + t.probe, count + 1));
        if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        }
    }
}

impl<'a> IntoIterator for &'a TestHistory {
    type Item = &'a Test;
    type IntoIter = std::slice::Iter<'a, Test>;

    fn into_iter(self) -> Self::IntoIter {
        self.tests.iter()
    }
}
