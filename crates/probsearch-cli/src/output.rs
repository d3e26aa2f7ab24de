//! Output formatting for the CLI.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use colored::*;
use probsearch_core::{Estimate, EstimatorConfig, StepRecord, TestHistory, Trajectory};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Good,
    Bad,
    Note,
    Caution,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a one-shot estimate for `history`.
    pub fn format_estimate(&self, history: &TestHistory, estimate: &Estimate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "tests": history.len(),
                "estimate": estimate,
            }))?),
            OutputFormat::Quiet => Ok(quiet_line(estimate)),
            OutputFormat::Table => {
                let mut rows = vec![
                    ("Tests", history.len().to_string()),
                    ("Seed", pair(estimate.seed.mean, estimate.seed.std_dev)),
                    ("MAP", pair(estimate.map.x, estimate.map.y)),
                    ("Climb evaluations", estimate.map.evaluations.to_string()),
                    ("Climb converged", estimate.map.converged.to_string()),
                    ("Mean", format!("{:.6}", estimate.posterior.mean)),
                    ("Std dev", format!("{:.6}", estimate.posterior.std_dev)),
                ];
                if let Some(integration) = &estimate.integration {
                    rows.push(("Mass", format!("{:.6e}", integration.mass())));
                    rows.push(("Converged", integration.converged().to_string()));
                }

                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (field, value) in rows {
                    builder.push_record([field.to_string(), value]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the posterior after every step of a replay.
    pub fn format_trajectory(&self, trajectory: &Trajectory) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(trajectory)?),
            OutputFormat::Quiet => Ok(trajectory
                .steps
                .iter()
                .map(|s| quiet_line(&s.estimate))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if trajectory.is_empty() {
                    return Ok(self.colorize("No tests replayed.", Tone::Caution));
                }

                let mut builder = Builder::default();
                builder.push_record(["Step", "Probe", "Outcome", "Mean", "Std Dev", "Mass"]);
                for step in &trajectory.steps {
                    let mass = step
                        .estimate
                        .integration
                        .map(|i| format!("{:.4e}", i.mass()))
                        .unwrap_or_else(|| "-".to_string());
                    builder.push_record([
                        step.step.to_string(),
                        step.test.probe().to_string(),
                        step.test.outcome().to_string(),
                        format!("{:.6}", step.posterior().mean),
                        format!("{:.6}", step.posterior().std_dev),
                        mass,
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the recorded tests of a session.
    pub fn format_history(&self, history: &TestHistory) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(history.tests())?),
            OutputFormat::Quiet => Ok(history
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if history.is_empty() {
                    return Ok(self.colorize("No tests recorded.", Tone::Caution));
                }

                let mut builder = Builder::default();
                builder.push_record(["Step", "Probe", "Outcome"]);
                for (i, test) in history.iter().enumerate() {
                    builder.push_record([
                        (i + 1).to_string(),
                        test.probe().to_string(),
                        test.outcome().to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the configured profiles.
    pub fn format_profiles(&self, config: &Config) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "active_profile": config.active_profile,
                "profiles": config.profiles,
            }))?),
            OutputFormat::Quiet => Ok(config
                .profiles
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if config.profiles.is_empty() {
                    return Ok(self.colorize("No profiles configured.", Tone::Caution));
                }

                let mut builder = Builder::default();
                builder.push_record([
                    "", "Profile", "Mode", "Objective", "Min Step", "Max Depth", "Prior",
                ]);
                for (name, profile) in &config.profiles {
                    let marker = if name == &config.active_profile { "*" } else { "" };
                    builder.push_record([
                        marker.to_string(),
                        name.clone(),
                        profile.mode.as_str().to_string(),
                        format!("{:?}", profile.objective),
                        profile.climb.min_step.to_string(),
                        profile.integration.max_depth.to_string(),
                        profile.initial_prior.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a single profile in detail.
    pub fn format_profile(&self, name: &str, profile: &EstimatorConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(profile)?),
            OutputFormat::Quiet => Ok(name.to_string()),
            OutputFormat::Table => {
                let max_evaluations = profile
                    .integration
                    .max_evaluations
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unlimited".to_string());

                let climb_budget = profile
                    .climb
                    .max_evaluations
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unlimited".to_string());
                let climb = &profile.climb;
                let region = &profile.region;
                let integration = &profile.integration;

                let rows = [
                    ("Profile", name.to_string()),
                    ("Initial prior", profile.initial_prior.to_string()),
                    ("Mode", profile.mode.as_str().to_string()),
                    ("Objective", format!("{:?}", profile.objective)),
                    ("Tie break", format!("{:?}", climb.tie_break)),
                    (
                        "Step",
                        format!(
                            "max({}, {}·σ) -> {}",
                            climb.initial_step, climb.relative_initial_step, climb.min_step
                        ),
                    ),
                    ("Climb budget", climb_budget),
                    ("Seed fallback", format!("±{}", profile.seed.fallback_bound)),
                    (
                        "Region",
                        format!(
                            "mean ±max({}, {}·σ), std dev ×[{}, {}]",
                            region.mean_half_width,
                            region.mean_half_width_scale,
                            region.std_dev_min_factor,
                            region.std_dev_max_factor
                        ),
                    ),
                    (
                        "Tolerance",
                        format!(
                            "{} (2D), {} (1D)",
                            integration.tolerance_2d, integration.tolerance_1d
                        ),
                    ),
                    ("Normalize to peak", profile.normalize_to_peak.to_string()),
                    ("Max depth", integration.max_depth.to_string()),
                    ("Max evaluations", max_evaluations),
                ];

                let mut builder = Builder::default();
                builder.push_record(["Setting", "Value"]);
                for (setting, value) in rows {
                    builder.push_record([setting.to_string(), value]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// One-line summary of an observed step, used by the REPL.
    pub fn step_line(&self, record: &StepRecord) -> String {
        let posterior = record.posterior();
        let mut line = format!(
            "#{} {} -> mean {:.6}, std dev {:.6}",
            record.step, record.test, posterior.mean, posterior.std_dev
        );
        if let Some(integration) = &record.estimate.integration {
            if !integration.converged() {
                line.push_str(&self.colorize(" (integration not converged)", Tone::Caution));
            }
        }
        line
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), Tone::Good)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), Tone::Bad)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), Tone::Note)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), Tone::Caution)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, tone: Tone) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match tone {
            Tone::Good => text.green().to_string(),
            Tone::Bad => text.red().to_string(),
            Tone::Note => text.blue().to_string(),
            Tone::Caution => text.yellow().to_string(),
        }
    }
}

fn pair(a: f64, b: f64) -> String {
    format!("({:.6}, {:.6})", a, b)
}

fn quiet_line(estimate: &Estimate) -> String {
    format!("{} {}", estimate.posterior.mean, estimate.posterior.std_dev)
}
