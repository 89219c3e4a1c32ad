//! hookcron - timed HTTP job scheduler
//!
//! Main entry point for the hookcron CLI and server.

mod cli;
mod server;
mod signal;

use clap::Parser;
use tracing::warn;

use hookcron_config::{Config, ConfigLoader, ConfigValidator, ValidationWarning};

use crate::cli::{Cli, Commands, RunArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Run) => run(&cli.config, cli.overrides).await,
        Some(Commands::CheckConfig) => check_config(&cli.config, cli.overrides),
    }
}

/// Load the configuration file (defaults when missing), apply CLI
/// overrides and validate.
fn load_config(
    path: &std::path::Path,
    overrides: RunArgs,
) -> Result<(Config, Vec<ValidationWarning>), Box<dyn std::error::Error>> {
    let mut config = ConfigLoader::load_or_default(path)?;
    overrides.apply(&mut config);
    let warnings = ConfigValidator::validate(&config).into_result()?;
    Ok((config, warnings))
}

async fn run(
    path: &std::path::Path,
    overrides: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, warnings) = load_config(path, overrides)?;

    server::init_tracing(&config.logging)?;
    for warning in &warnings {
        warn!(field = %warning.path, "{}", warning.message);
    }

    server::run_server(config).await
}

fn check_config(
    path: &std::path::Path,
    overrides: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, warnings) = load_config(path, overrides)?;

    if !path.exists() {
        println!("# {} not found, using built-in defaults", path.display());
    }
    for warning in &warnings {
        println!("# warning: {}: {}", warning.path, warning.message);
    }
    print!("{}", ConfigLoader::to_toml(&config)?);
    Ok(())
}
