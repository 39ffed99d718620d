//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod query;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iq_core::config::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

/// inline-query - Load the inline comments a viewer can see
#[derive(Debug, Parser)]
#[command(name = "inline-query")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Query inline comments
    Query(query::QueryArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Query(args) => {
            let config = load_config(&config_path)?;
            query::execute(args, &config)
        }
        Commands::Config(cmd) => config::execute(cmd, &config_path),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Platform config file location
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("com", "inline-query", "inline-query")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".inline-query/config.toml"))
}

/// Load configuration, falling back to defaults when the file is missing
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("No configuration at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
}
