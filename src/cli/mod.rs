//! Command-line interface for sc4pac-tools.
//!
//! # Commands
//!
//! - `track` - list the packages and files a plugin needs, and what is missing
//! - `verify` - track every folder matching a pattern and report the broken ones
//! - `index` - build the plugin index and write the cache
//! - `find` - look up records in the index
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--config <path>` - use a different `config.toml`
//! - `--no-progress` - hide spinners
//!
//! # Examples
//!
//! ```bash
//! # Dependencies of an installed package
//! sc4pac-tools track mattb325:sunset-apartments
//!
//! # A folder relative to the plugins folder, as JSON
//! sc4pac-tools track 200-residential/my-lots --format json
//!
//! # Every residential package
//! sc4pac-tools verify '200-residential/*'
//! ```

pub mod common;
mod find;
mod index;
mod track;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ToolsConfig;
use crate::constants::NO_PROGRESS_ENV;

pub use common::TrackerArgs;

/// Settings derived from the global flags, applied once before a command runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `None` disables logging except errors.
    pub log_level: Option<String>,
    pub no_progress: bool,
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Export settings that library code reads from the environment.
    pub fn apply_to_env(&self) {
        if self.no_progress {
            // SAFETY: called once at startup before any worker threads read the environment.
            unsafe {
                std::env::set_var(NO_PROGRESS_ENV, "1");
            }
        }
    }
}

/// Initialize stderr logging. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("sc4pac_tools={}", level.unwrap_or("error")))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "sc4pac-tools",
    about = "Dependency tracking for SimCity 4 plugins",
    version,
    long_about = "Finds the files and sc4pac packages a SimCity 4 plugin depends on by following \
                  lot objects, resource keys and parent cohorts through the plugins folder."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Hide progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the dependencies of plugin files, folders or packages
    Track(track::TrackCommand),

    /// Track every folder matching a pattern and report missing dependencies
    Verify(verify::VerifyCommand),

    /// Build the plugin index and write the cache
    Index(index::IndexCommand),

    /// Look up records in the plugin index
    Find(find::FindCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();
        init_logging(config.log_level.as_deref());

        let tools_config = ToolsConfig::load_with_optional(config.config_path.clone()).await?;

        match self.command {
            Commands::Track(cmd) => cmd.execute(&tools_config).await,
            Commands::Verify(cmd) => cmd.execute(&tools_config).await,
            Commands::Index(cmd) => cmd.execute(&tools_config).await,
            Commands::Find(cmd) => cmd.execute(&tools_config).await,
        }
    }
}
