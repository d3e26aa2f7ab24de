//! probsearch CLI - Probabilistic binary search from the command line.

use clap::Parser;
use probsearch_cli::commands;
use probsearch_cli::repl;
use probsearch_cli::{logging, Cli, Command, Config, Formatter};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> probsearch_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    let mut estimator_config = config.get_active_profile()?.clone();
    if let Some(mode) = cli.mode {
        estimator_config.mode = mode.into();
    }
    tracing::debug!("Using profile '{}' ({:?})", config.active_profile, estimator_config.mode);

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&config, estimator_config, &formatter)?;
        }
        Some(Command::Estimate(args)) => {
            commands::execute_estimate(args, &estimator_config, &formatter)?;
        }
        Some(Command::Replay(args)) => {
            commands::execute_replay(args, &estimator_config, &formatter)?;
        }
        Some(Command::Search(args)) => {
            commands::execute_search(args, &estimator_config, &formatter)?;
        }
        Some(Command::Profile(args)) => {
            commands::execute_profile(args, &mut config, &formatter)?;
        }
    }

    Ok(())
}
