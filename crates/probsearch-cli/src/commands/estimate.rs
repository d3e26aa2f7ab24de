//! Estimate command implementation.

use crate::cli::EstimateArgs;
use crate::error::Result;
use crate::output::Formatter;
use probsearch_core::{compute_posterior, EstimatorConfig, TestHistory};

/// Execute the estimate command.
pub fn execute_estimate(
    args: EstimateArgs,
    config: &EstimatorConfig,
    formatter: &Formatter,
) -> Result<()> {
    println!("{}", estimate_report(args, config, formatter)?);
    Ok(())
}

fn estimate_report(
    args: EstimateArgs,
    config: &EstimatorConfig,
    formatter: &Formatter,
) -> Result<String> {
    config.validate()?;
    let history = TestHistory::from_tests(args.tests)?;
    let estimate = compute_posterior(&history, config)?;
    formatter.format_estimate(&history, &estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use probsearch_core::{PosteriorMode, Test};

    #[test]
    fn test_estimate_report() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = EstimateArgs {
            tests: vec![Test::greater(3.0), Test::less(10.0)],
        };
        let output = estimate_report(args, &EstimatorConfig::default(), &formatter).unwrap();
        let mean: f64 = output.split_whitespace().next().unwrap().parse().unwrap();
        assert!((mean - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_integrated_report_has_mass() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let config = EstimatorConfig {
            mode: PosteriorMode::IntegratedStdDev,
            ..EstimatorConfig::default()
        };
        let args = EstimateArgs {
            tests: vec![Test::greater(3.0), Test::less(10.0)],
        };
        let output = estimate_report(args, &config, &formatter).unwrap();
        assert!(output.contains("Mass"));
        assert!(output.contains("Converged"));
    }

    #[test]
    fn test_non_finite_probe_rejected() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = EstimateArgs {
            tests: vec![Test::greater(f64::NAN)],
        };
        let result = estimate_report(args, &EstimatorConfig::default(), &formatter);
        assert!(matches!(result, Err(CliError::Estimate(_))));
    }
}
