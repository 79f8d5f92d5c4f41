//! Track many package folders at once and report those with missing
//! dependencies.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::common::TrackerArgs;
use crate::config::ToolsConfig;
use crate::tracker::{DependencyTracker, DumpOptions, MissingRef};
use crate::utils::fs::expand_source_path;
use crate::utils::progress::ProgressBar;

#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// Glob relative to the plugins folder selecting the folders to check
    #[arg(value_name = "PATTERN", default_value = "*/*")]
    pub pattern: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

#[derive(Debug, Serialize)]
struct BrokenFolder {
    folder: PathBuf,
    missing: Vec<MissingRef>,
}

impl VerifyCommand {
    pub async fn execute(self, config: &ToolsConfig) -> Result<()> {
        let options = self.tracker.to_options(config)?;
        let folders = matching_folders(&options.plugins, &self.pattern)?;
        let tracker = DependencyTracker::new(options);
        tracker.ensure_index().await?;

        let bar = ProgressBar::new(folders.len() as u64);
        let mut broken = Vec::new();
        for folder in &folders {
            if let Some(name) = folder.file_name() {
                bar.set_message(name.to_string_lossy());
            }
            let files = expand_source_path(folder)?;
            let result = tracker.track_files(files).await?;
            debug!("{}: {} missing", folder.display(), result.missing.len());
            bar.inc(1);

            if result.has_missing() {
                broken.push((folder.clone(), result));
            }
        }
        bar.finish_and_clear();

        if self.format == "json" {
            let report: Vec<BrokenFolder> = broken
                .into_iter()
                .map(|(folder, result)| BrokenFolder {
                    folder,
                    missing: result.missing,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        for (folder, result) in &broken {
            println!("{}", folder.display().to_string().bold());
            result.dump(&DumpOptions {
                packages: false,
                missing: true,
                files: false,
            });
            println!();
        }
        if broken.is_empty() {
            println!("{}", format!("All {} folders resolved", folders.len()).green());
        } else {
            println!("{}", format!("{} of {} folders have missing dependencies", broken.len(), folders.len()).red());
        }

        Ok(())
    }
}

/// Folders below `plugins` matching `pattern`, sorted.
fn matching_folders(plugins: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!("{}/{}", glob::Pattern::escape(&plugins.to_string_lossy()), pattern.trim_start_matches('/'));
    let mut folders: Vec<PathBuf> = glob::glob(&full)
        .with_context(|| format!("Invalid pattern: {pattern}"))?
        .filter_map(Result::ok)
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();
    Ok(folders)
}
