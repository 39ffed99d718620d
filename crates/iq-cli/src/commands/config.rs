//! Config command
//!
//! Manage inline-query configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use iq_core::config::Config;
use std::fs;
use std::path::Path;

use super::load_config;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(path, json),
        ConfigCommand::Init { force } => init_config(path, force),
    }
}

fn show_config(path: &Path, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = load_config(path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if path.exists() {
        println!("{}", path.display().to_string().dimmed());
    } else {
        println!(
            "{}",
            format!("{} (not found, showing defaults)", path.display()).dimmed()
        );
    }
    println!();
    println!("{}", config.to_toml_string()?);

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    use colored::Colorize;

    if path.exists() && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = format!(
        "# inline-query configuration\n\n{}",
        Config::default().to_toml_string()?
    );
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
