//! Flags shared by every command that needs the plugin index.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::ToolsConfig;
use crate::core::Sc4pacError;
use crate::tracker::TrackerOptions;

/// Where to find plugins and how to index them. Overrides `config.toml`.
#[derive(Debug, Clone, Default, Args)]
pub struct TrackerArgs {
    /// Plugins folder [default: Documents/SimCity 4/Plugins]
    #[arg(long, value_name = "DIR")]
    pub plugins: Option<PathBuf>,

    /// Game installation to index before the plugins
    #[arg(long, value_name = "DIR")]
    pub game_dir: Option<PathBuf>,

    /// Additional folder or file to index (repeatable)
    #[arg(long, value_name = "PATH")]
    pub scan: Vec<PathBuf>,

    /// Index cache file
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Neither read nor write the index cache
    #[arg(long, conflicts_with = "cache")]
    pub no_cache: bool,

    /// Maximum number of files read concurrently
    #[arg(long, value_name = "NUMBER")]
    pub max_concurrency: Option<usize>,
}

impl TrackerArgs {
    /// Merge the flags over the config file.
    pub fn to_options(&self, config: &ToolsConfig) -> Result<TrackerOptions> {
        let mut options = config.tracker_options()?;

        if let Some(plugins) = &self.plugins {
            options.plugins.clone_from(plugins);
        }
        if let Some(game_dir) = &self.game_dir {
            options.game_dir = Some(game_dir.clone());
        }
        options.scan.extend(self.scan.iter().cloned());

        if self.no_cache {
            options.cache = None;
            options.use_cache = false;
        } else if let Some(cache) = &self.cache {
            options.cache = Some(cache.clone());
        }

        if let Some(max) = self.max_concurrency {
            if max == 0 {
                return Err(Sc4pacError::ConfigError {
                    message: "--max-concurrency must be at least 1".to_string(),
                }
                .into());
            }
            options.max_concurrency = max;
        }

        Ok(options)
    }
}
