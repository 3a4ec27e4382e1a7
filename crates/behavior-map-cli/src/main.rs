//! behavior-map: discover latent processes in an interaction log.
//!
//! # Commands
//!
//! - `discover`: assemble sessions, train activity vectors, cluster them
//! - `sessions`: assemble sessions and report corpus statistics only
//!
//! Results go to stdout (or `--output`) as JSON; logs go to stderr.

mod commands;
mod ingest;
mod output;

use std::path::Path;

use anyhow::Context;
use behavior_map_core::config::{Config, LoggingConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::commands::{discover::DiscoverArgs, sessions::SessionsArgs};

#[derive(Parser)]
#[command(name = "behavior-map", version, about = "Discover latent processes in interaction logs")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML). Defaults to config/default.toml layered
    /// with BEHAVIOR_MAP__* environment variables.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and emit the activity → cluster assignment
    ///
    /// # Examples
    ///
    /// ```bash
    /// behavior-map discover --input events.jsonl --cluster-count 6 --seed 7
    /// ```
    Discover(DiscoverArgs),

    /// Assemble sessions and print the assembly report and vocabulary statistics
    Sessions(SessionsArgs),
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Config::load().context("loading layered configuration"),
    }
}

fn init_logging(verbose: bool, logging: &LoggingConfig) -> anyhow::Result<()> {
    // stdout carries the JSON result, so logs go to stderr.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?
    };
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.logging)?;

    match cli.command {
        Commands::Discover(args) => commands::discover::run(args, config),
        Commands::Sessions(args) => commands::sessions::run(args, config),
    }
}
