//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod relations;
pub mod run;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Dutchbook - Relationship-driven arbitrage on constant-product prediction markets.
#[derive(Parser, Debug)]
#[command(name = "dutchbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the trading agent (dry run unless --live or `dry_run = false`)
    Run(RunArgs),

    /// Inspect and edit declared relationships
    #[command(subcommand)]
    Relations(RelationsCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `dutchbook relations`
#[derive(Subcommand, Debug)]
pub enum RelationsCommand {
    /// Print every declared relationship
    List(RelationsArgs),
    /// Interactively declare a new relationship
    Add(RelationsArgs),
}

/// Subcommands for `dutchbook check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration and relationship document
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `relations` subcommands.
#[derive(Parser, Debug)]
pub struct RelationsArgs {
    /// Path to configuration file; defaults apply if it does not exist
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Relationship document, overriding `agent.relations_path`
    #[arg(short, long)]
    pub relations: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Place real bets, overriding `dry_run` in the config
    #[arg(long)]
    pub live: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Override the per-plan budget for opening positions
    #[arg(long)]
    pub max_cost: Option<Decimal>,

    /// Override plans executed per relationship per cycle
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}
