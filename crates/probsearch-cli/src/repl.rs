//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! The user acts as the comparison oracle: each line reports how the hidden
//! value compared against a probe, and the posterior is updated in place.
//! `next` samples a probe around the current belief for the user to try.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use probsearch_core::{
    sample_probe, Estimator, EstimatorConfig, Outcome, Test, DEFAULT_PROBE_SPREAD,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive REPL.
pub fn run_repl(
    config: &Config,
    estimator_config: EstimatorConfig,
    formatter: &Formatter,
) -> Result<()> {
    println!(
        "{}",
        formatter.info("probsearch REPL - Type 'help' for commands, 'exit' to quit")
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)?
        .auto_add_history(false)
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    // Load history
    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut estimator = Estimator::new(estimator_config)?;
    let mut rng = StdRng::from_entropy();
    println!("{}", formatter.info(&format!("Prior: {}", estimator.posterior())));

    loop {
        let prompt = format!("probsearch[{}]> ", estimator.history().len());

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(cmd) => {
                        let result = execute_repl_command(cmd, &mut estimator, &mut rng, formatter);
                        if let Err(e) = result {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    // Save history
    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    Observe(Test),
    Posterior,
    Next,
    History,
    Reset,
}

/// Parse a REPL command line.
///
/// A test is written `<probe> <outcome>` or `<probe>:<outcome>`.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let Some(first) = parts.first() else {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    };

    match *first {
        "exit" | "quit" | "q" => return Ok(ReplCommand::Exit),
        "help" | "?" => return Ok(ReplCommand::Help),
        "posterior" | "show" => return Ok(ReplCommand::Posterior),
        "next" | "suggest" => return Ok(ReplCommand::Next),
        "history" => return Ok(ReplCommand::History),
        "reset" => return Ok(ReplCommand::Reset),
        _ => {}
    }

    let test = match parts.as_slice() {
        [single] => single.parse::<Test>().map_err(CliError::InvalidInput)?,
        [probe, outcome] => parse_test_parts(probe, outcome)?,
        _ => {
            return Err(CliError::InvalidInput(format!(
                "Unknown command: {}. Type 'help' for available commands.",
                line
            )))
        }
    };
    Ok(ReplCommand::Observe(test))
}

fn parse_test_parts(probe: &str, outcome: &str) -> Result<Test> {
    let probe: f64 = probe.parse().map_err(|_| {
        CliError::InvalidInput(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            probe
        ))
    })?;
    let outcome: Outcome = outcome.parse().map_err(CliError::InvalidInput)?;
    Ok(Test::new(probe, outcome))
}

/// Execute a REPL command.
fn execute_repl_command<R: Rng>(
    cmd: ReplCommand,
    estimator: &mut Estimator,
    rng: &mut R,
    formatter: &Formatter,
) -> Result<()> {
    match cmd {
        ReplCommand::Observe(test) => {
            let record = estimator.observe(test)?;
            println!("{}", formatter.step_line(&record));
        }
        ReplCommand::Posterior => {
            println!("{}", formatter.info(&format!("Posterior: {}", estimator.posterior())));
        }
        ReplCommand::Next => {
            let probe = suggest_probe(estimator, rng)?;
            println!("{}", formatter.info(&format!("Next probe: {}", probe)));
        }
        ReplCommand::History => {
            println!("{}", formatter.format_history(estimator.history())?);
        }
        ReplCommand::Reset => {
            estimator.reset();
            let message = format!("Reset to prior {}", estimator.posterior());
            println!("{}", formatter.success(&message));
        }
        ReplCommand::Exit | ReplCommand::Help => {}
    }

    Ok(())
}

/// Sample the next probe around the current posterior.
fn suggest_probe<R: Rng>(estimator: &Estimator, rng: &mut R) -> Result<f64> {
    Ok(sample_probe(&estimator.posterior(), DEFAULT_PROBE_SPREAD, rng)?)
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::home_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <probe> <outcome>              - Record a test, e.g. '7.5 gt' or '9 <'");
    println!("  <probe>:<outcome>              - Same, e.g. '7.5:gt'");
    println!("    outcome: gt|greater|>|+ (hidden value above the probe)");
    println!("             lt|less|<|-    (hidden value not above the probe)");
    println!("  posterior, show                - Show the current posterior");
    println!("  next, suggest                  - Suggest a probe near the current belief");
    println!("  history                        - List recorded tests");
    println!("  reset                          - Forget all tests");
    println!("  help, ?                        - Show this help");
    println!("  exit, quit, q                  - Exit REPL");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_repl_command("quit").unwrap(), ReplCommand::Exit);
        assert_eq!(parse_repl_command("?").unwrap(), ReplCommand::Help);
        assert_eq!(parse_repl_command("show").unwrap(), ReplCommand::Posterior);
        assert_eq!(parse_repl_command("history").unwrap(), ReplCommand::History);
        assert_eq!(parse_repl_command("reset").unwrap(), ReplCommand::Reset);
        assert_eq!(parse_repl_command("next").unwrap(), ReplCommand::Next);
        assert_eq!(parse_repl_command("suggest").unwrap(), ReplCommand::Next);
    }

    #[test]
    fn test_parse_tests() {
        assert_eq!(
            parse_repl_command("7.5 gt").unwrap(),
            ReplCommand::Observe(Test::greater(7.5))
        );
        assert_eq!(
            parse_repl_command("-3 <").unwrap(),
            ReplCommand::Observe(Test::less(-3.0))
        );
        assert_eq!(
            parse_repl_command("9:LT").unwrap(),
            ReplCommand::Observe(Test::less(9.0))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_repl_command("").is_err());
        assert!(parse_repl_command("frobnicate").is_err());
        assert!(parse_repl_command("7.5 maybe").is_err());
        assert!(parse_repl_command("1 gt extra").is_err());
    }

    #[test]
    fn test_session_updates_and_resets() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
        let mut rng = rng();

        for line in ["3 gt", "10 lt"] {
            let cmd = parse_repl_command(line).unwrap();
            execute_repl_command(cmd, &mut estimator, &mut rng, &formatter).unwrap();
        }
        assert_eq!(estimator.history().len(), 2);
        assert!((estimator.posterior().mean - 6.5).abs() < 1e-9);

        execute_repl_command(ReplCommand::Reset, &mut estimator, &mut rng, &formatter).unwrap();
        assert!(estimator.history().is_empty());
        assert_eq!(estimator.posterior(), EstimatorConfig::default().initial_prior);
    }

    #[test]
    fn test_session_rejects_non_finite_probe() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();

        let cmd = parse_repl_command("inf gt").unwrap();
        assert!(execute_repl_command(cmd, &mut estimator, &mut rng(), &formatter).is_err());
        assert!(estimator.history().is_empty());
    }

    #[test]
    fn test_next_suggests_without_recording() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
        let mut rng = rng();

        let cmd = parse_repl_command("next").unwrap();
        execute_repl_command(cmd, &mut estimator, &mut rng, &formatter).unwrap();
        assert!(estimator.history().is_empty());

        // Same seed, same suggestion
        let first = suggest_probe(&estimator, &mut self::rng()).unwrap();
        let second = suggest_probe(&estimator, &mut self::rng()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_suggestions_follow_posterior() {
        let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
        estimator.observe(Test::greater(100.0)).unwrap();
        estimator.observe(Test::less(104.0)).unwrap();
        let belief = estimator.posterior();

        let mut rng = rng();
        let suggestions: Vec<f64> = (0..500)
            .map(|_| suggest_probe(&estimator, &mut rng).unwrap())
            .collect();
        let mean = suggestions.iter().sum::<f64>() / suggestions.len() as f64;
        let scale = belief.std_dev + DEFAULT_PROBE_SPREAD;
        assert!((mean - belief.mean).abs() < 0.3 * scale, "mean = {}", mean);
    }
}
