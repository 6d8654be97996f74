// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! powercuts CLI - Northern Powergrid power cuts from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Add a postcode to monitor
//! powercuts config add "NE1 1AA" --name Home
//!
//! # Show current power cuts for every configured postcode
//! powercuts
//!
//! # One-off lookup without configuring anything
//! powercuts status --postcode "DH1 3LE"
//!
//! # JSON output
//! powercuts --format json --pretty
//!
//! # Refresh every 15 minutes
//! powercuts watch
//!
//! # Is the API up?
//! powercuts check
//! ```

mod commands;
mod monitor;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use powercuts_store::{LogLevel, SettingsStore, default_settings_path};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{check, config, status, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// powercuts CLI - Northern Powergrid power cut monitoring.
#[derive(Parser)]
#[command(name = "powercuts")]
#[command(about = "Northern Powergrid power cut monitoring CLI")]
#[command(long_about = r#"
powercuts polls the Northern Powergrid power cut API and shows the power
cuts affecting your postcodes as a set of sensors.

Examples:
  powercuts config add "NE1 1AA"   # Monitor a postcode
  powercuts                        # Current power cuts
  powercuts watch                  # Refresh every 15 minutes
  powercuts --format json          # JSON output
  powercuts check                  # Is the API reachable?
"#)]
#[command(version)]
#[command(author = "Powercuts Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'status' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Settings file to use instead of the default.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

impl Cli {
    /// Settings file in effect.
    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(default_settings_path)
    }

    /// Loads the settings store.
    pub async fn load_settings(&self) -> Result<SettingsStore> {
        Ok(SettingsStore::load(self.settings_path()).await?)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Refresh once and show every sensor (default if no command specified).
    #[command(visible_alias = "s")]
    Status(status::StatusArgs),

    /// Refresh on an interval and keep showing sensors.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Check the API is reachable.
    Check,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("powercuts=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("powercuts={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.load_settings().await {
        Ok(store) => store.get().await.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_logging(cli.verbose, cli.quiet, level);

    let result = match &cli.command {
        Some(Commands::Status(args)) => status::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
        Some(Commands::Check) => check::run(&cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => status::run(&status::StatusArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
