//! Replay command implementation.

use crate::cli::ReplayArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use probsearch_core::{Estimator, EstimatorConfig, ReplaySource, Test};
use std::fs;
use std::io::{self, Read};

/// Execute the replay command.
pub fn execute_replay(
    args: ReplayArgs,
    config: &EstimatorConfig,
    formatter: &Formatter,
) -> Result<()> {
    // Read tests from file or stdin
    let json_data = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = &args.file {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ));
    };

    let tests = parse_tests(&json_data)?;
    println!("{}", replay_report(tests, args.steps, config, formatter)?);
    Ok(())
}

/// Parse a JSON array of `{"probe": .., "outcome": ..}` objects.
pub fn parse_tests(json: &str) -> Result<Vec<Test>> {
    let tests: Vec<Test> = serde_json::from_str(json)?;
    if tests.is_empty() {
        return Err(CliError::InvalidInput("No tests provided".to_string()));
    }
    Ok(tests)
}

fn replay_report(
    tests: Vec<Test>,
    steps: Option<usize>,
    config: &EstimatorConfig,
    formatter: &Formatter,
) -> Result<String> {
    let steps = steps.unwrap_or(tests.len());
    let mut estimator = Estimator::new(config.clone())?;
    let trajectory = estimator.run(&mut ReplaySource::new(tests), steps)?;
    formatter.format_trajectory(&trajectory)
}
