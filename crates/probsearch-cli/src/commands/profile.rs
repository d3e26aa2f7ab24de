//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs, ProfileSetArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use probsearch_core::{EstimatorConfig, ObjectiveScale};

/// Execute the profile command.
pub fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => println!("{}", formatter.format_profiles(config)?),
        ProfileAction::Show => show_active_profile(config, formatter)?,
        ProfileAction::Switch { name } => switch_profile(config, name, formatter)?,
        ProfileAction::Set(set) => set_profile(config, set, formatter)?,
        ProfileAction::Delete { name } => delete_profile(config, name, formatter)?,
    }
    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;
    println!("{}", formatter.format_profile(&config.active_profile, profile)?);
    Ok(())
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save()?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile.
fn set_profile(config: &mut Config, args: ProfileSetArgs, formatter: &Formatter) -> Result<()> {
    let existing = config.profiles.get(&args.name).cloned();
    let action = if existing.is_some() { "Updated" } else { "Created" };

    let base = match (&args.from, existing) {
        (Some(from), _) => config
            .profiles
            .get(from)
            .cloned()
            .ok_or_else(|| CliError::Config(format!("Profile '{}' does not exist", from)))?,
        (None, Some(profile)) => profile,
        (None, None) => EstimatorConfig::default(),
    };

    let name = args.name.clone();
    config.set_profile(name.clone(), apply_overrides(base, &args))?;
    config.save()?;

    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, name))
    );

    Ok(())
}

/// Apply the settings given on the command line to `profile`.
fn apply_overrides(mut profile: EstimatorConfig, args: &ProfileSetArgs) -> EstimatorConfig {
    if let Some(mode) = args.posterior {
        profile.mode = mode.into();
    }
    if let Some(log) = args.log_objective {
        profile.objective = if log {
            ObjectiveScale::LogProbability
        } else {
            ObjectiveScale::Probability
        };
    }
    if let Some(step) = args.initial_step {
        profile.climb.initial_step = step;
    }
    if let Some(step) = args.min_step {
        profile.climb.min_step = step;
    }
    if let Some(tolerance) = args.tolerance {
        profile.integration.tolerance_2d = tolerance;
    }
    if let Some(depth) = args.max_depth {
        profile.integration.max_depth = depth;
    }
    if let Some(mean) = args.prior_mean {
        profile.initial_prior.mean = mean;
    }
    if let Some(std_dev) = args.prior_std_dev {
        profile.initial_prior.std_dev = std_dev;
    }
    profile
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(&name).is_some() {
        config.save()?;
        println!(
            "{}",
            formatter.success(&format!("Deleted profile '{}'", name))
        );
    } else {
        println!(
            "{}",
            formatter.warning(&format!("Profile '{}' does not exist", name))
        );
    }

    Ok(())
}
