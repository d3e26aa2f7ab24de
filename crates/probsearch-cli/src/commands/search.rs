//! Search command implementation.
//!
//! Runs the estimator against a simulated oracle that knows the target, so a
//! profile can be tried out end to end.

use crate::cli::SearchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use probsearch_core::{Estimator, EstimatorConfig, OracleSource};

/// Execute the search command.
pub fn execute_search(
    args: SearchArgs,
    config: &EstimatorConfig,
    formatter: &Formatter,
) -> Result<()> {
    println!("{}", search_report(args, config, formatter)?);
    Ok(())
}

fn search_report(
    args: SearchArgs,
    config: &EstimatorConfig,
    formatter: &Formatter,
) -> Result<String> {
    if !args.target.is_finite() {
        return Err(CliError::InvalidInput(format!(
            "Target must be finite, got {}",
            args.target
        )));
    }

    let target = args.target;
    let oracle = move |probe: f64| target > probe;
    let source = match args.seed {
        Some(seed) => OracleSource::seeded(oracle, seed),
        None => OracleSource::from_entropy(oracle),
    };

    let mut estimator = Estimator::new(config.clone())?;
    let trajectory = estimator.run(&mut source.with_spread(args.spread), args.steps)?;

    if let Some(posterior) = trajectory.final_posterior() {
        tracing::info!(
            "Search for {} ended at {} (error {})",
            target,
            posterior,
            (posterior.mean - target).abs()
        );
    }
    formatter.format_trajectory(&trajectory)
}
