//! CLI definitions for hookcron.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// hookcron CLI.
#[derive(Parser)]
#[command(name = "hookcron")]
#[command(about = "Timed HTTP job scheduler")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/hookcron.toml", global = true)]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler and its HTTP API in foreground (default)
    Run,

    /// Validate the configuration and print the effective settings
    CheckConfig,
}

/// Overrides applied on top of the configuration file.
#[derive(Debug, Default, clap::Args)]
pub(crate) struct RunArgs {
    /// Listen host
    #[arg(long, env = "HOOKCRON_HOST", global = true)]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "HOOKCRON_PORT", global = true)]
    pub port: Option<u16>,

    /// SQLite database path
    #[arg(long, env = "HOOKCRON_DB", global = true)]
    pub db: Option<PathBuf>,
}

impl RunArgs {
    pub fn apply(self, config: &mut hookcron_config::Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = self.db {
            config.storage.path = db;
        }
    }
}
