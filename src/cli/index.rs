//! Build the plugin index and write its cache.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::TrackerArgs;
use crate::config::ToolsConfig;
use crate::tracker::DependencyTracker;

#[derive(Debug, Args)]
pub struct IndexCommand {
    /// Ignore an existing cache and scan everything again
    #[arg(long)]
    pub rebuild: bool,

    /// Write the cache here instead of the configured location
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

impl IndexCommand {
    pub async fn execute(self, config: &ToolsConfig) -> Result<()> {
        let mut options = self.tracker.to_options(config)?;
        if let Some(output) = self.output {
            options.cache = Some(output);
        }
        if self.rebuild {
            options.use_cache = false;
        }

        let cache = options.cache.clone();
        let tracker = DependencyTracker::new(options);
        let index = tracker.ensure_index().await?;

        println!("{}", "Plugin index".bold());
        for root in index.roots() {
            println!("  root:     {}", root.path.display());
        }
        println!("  files:    {}", index.file_count());
        println!("  records:  {}", index.len());
        println!("  families: {}", index.family_count());
        if let Some(cache) = cache {
            println!("  cache:    {}", cache.display());
        }

        Ok(())
    }
}
