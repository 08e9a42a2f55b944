//! DirSync CLI - Command-line interface for DirSync
//!
//! Provides commands for:
//! - Running a sync cycle (or a dry run of one)
//! - Inspecting and recapturing the persisted snapshot baseline
//! - Viewing and validating configuration

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dirsync_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, snapshot::SnapshotCommand, sync::SyncCommand};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "dirsync", version, about = "Snapshot-based directory sync client")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one sync cycle against the sync server
    Sync(SyncCommand),
    /// Inspect or recapture the snapshot baseline
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let loaded = commands::load_config(&config_path);
    init_tracing(cli.verbose, cli.json, loaded.as_ref().ok());

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let result = match cli.command {
        Commands::Config(cmd) => cmd.execute(&config_path, format).await,
        Commands::Sync(cmd) => match loaded {
            Ok(config) => cmd.execute(&config, format).await,
            Err(e) => Err(e),
        },
        Commands::Snapshot(cmd) => match loaded {
            Ok(config) => cmd.execute(&config, format).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            get_formatter(cli.json).error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Sets up the global subscriber
///
/// `RUST_LOG` wins; otherwise `-v`/`-vv`, then `logging.level`. Logs go to
/// stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: u8, json: bool, config: Option<&Config>) {
    let level = match verbose {
        0 => config.map_or("info", |c| c.logging.level.as_str()),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json || config.is_some_and(|c| c.logging.json) {
        builder.json().init();
    } else {
        builder.init();
    }
}
