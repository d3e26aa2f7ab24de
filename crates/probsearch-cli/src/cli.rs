//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use probsearch_core::{PosteriorMode, Test, DEFAULT_PROBE_SPREAD};
use std::path::PathBuf;

/// probsearch - Estimate a hidden value from noisy greater/less comparisons.
#[derive(Debug, Parser)]
#[command(name = "probsearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PROBSEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Override the profile's posterior mode
    #[arg(short, long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (mean and std dev only)
    Quiet,
}

/// Posterior mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Hill-climb maximum only
    Map,
    /// Moments of the integrated likelihood
    Integrated,
    /// MAP mean, integrated std dev
    IntegratedStdDev,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the posterior for a list of tests
    Estimate(EstimateArgs),

    /// Replay recorded tests and print the posterior after each one
    Replay(ReplayArgs),

    /// Search for a known target, sampling each probe around the current belief
    Search(SearchArgs),

    /// Manage estimator profiles
    Profile(ProfileArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the estimate command.
#[derive(Debug, Parser)]
pub struct EstimateArgs {
    /// Tests as probe:outcome (e.g. 7.5:gt 9:lt)
    #[arg(required = true, allow_hyphen_values = true)]
    pub tests: Vec<Test>,
}

/// Arguments for the replay command.
#[derive(Debug, Parser)]
pub struct ReplayArgs {
    /// JSON file containing an array of {"probe", "outcome"} objects
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the JSON array from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Stop after this many tests
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Hidden value the simulated oracle compares probes against
    #[arg(short, long, allow_hyphen_values = true)]
    pub target: f64,

    /// Number of probes
    #[arg(short = 'n', long, default_value_t = 20)]
    pub steps: usize,

    /// Seed for probe sampling (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Amount added to the belief's std dev when sampling probes
    #[arg(long, default_value_t = DEFAULT_PROBE_SPREAD)]
    pub spread: f64,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set(ProfileSetArgs),

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Settings accepted by `profile set`; unset fields keep their current value.
#[derive(Debug, Default, Parser)]
pub struct ProfileSetArgs {
    /// Profile name
    pub name: String,

    /// Start a new profile from this existing one
    #[arg(long)]
    pub from: Option<String>,

    /// Posterior mode
    #[arg(long, value_enum)]
    pub posterior: Option<ModeArg>,

    /// Climb in the log domain
    #[arg(long)]
    pub log_objective: Option<bool>,

    /// Initial hill-climb step
    #[arg(long)]
    pub initial_step: Option<f64>,

    /// Minimum hill-climb step
    #[arg(long)]
    pub min_step: Option<f64>,

    /// 2D quadrature tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Maximum quadrature depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Initial prior mean
    #[arg(long, allow_hyphen_values = true)]
    pub prior_mean: Option<f64>,

    /// Initial prior std dev
    #[arg(long)]
    pub prior_std_dev: Option<f64>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ModeArg> for PosteriorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Map => PosteriorMode::Map,
            ModeArg::Integrated => PosteriorMode::Integrated,
            ModeArg::IntegratedStdDev => PosteriorMode::IntegratedStdDev,
        }
    }
}
