//! Track the dependencies of plugin files, folders and packages.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::TrackerArgs;
use crate::config::ToolsConfig;
use crate::tracker::{DependencyTracker, DumpOptions, TrackingResult};

#[derive(Debug, Args)]
pub struct TrackCommand {
    /// Files, folders (relative to the plugins folder) or package ids (group:name)
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<String>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Don't list required packages
    #[arg(long)]
    pub no_packages: bool,

    /// Don't list missing dependencies
    #[arg(long)]
    pub no_missing: bool,

    /// List every required file
    #[arg(long)]
    pub files: bool,

    /// Package the sources are expected to depend on (repeatable)
    #[arg(long, value_name = "PACKAGE")]
    pub declared: Vec<String>,

    /// Package to leave out of the undeclared check (repeatable)
    #[arg(long, value_name = "PACKAGE")]
    pub ignore: Vec<String>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

#[derive(Serialize)]
struct TrackReport<'a> {
    #[serde(flatten)]
    result: &'a TrackingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    undeclared: Option<Vec<String>>,
}

impl TrackCommand {
    pub async fn execute(self, config: &ToolsConfig) -> Result<()> {
        let options = self.tracker.to_options(config)?;
        let tracker = DependencyTracker::new(options);
        let result = tracker.track(&self.sources).await?;

        let undeclared = self.checks_declarations().then(|| result.extra_packages(&self.declared, &self.ignore));

        if self.format == "json" {
            let report = TrackReport {
                result: &result,
                undeclared,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        result.dump(&DumpOptions {
            packages: !self.no_packages,
            missing: !self.no_missing,
            files: self.files,
        });

        if let Some(undeclared) = undeclared {
            if undeclared.is_empty() {
                println!("{}", "All required packages are declared".green());
            } else {
                println!("{}", "Required but not declared:".yellow());
                for pkg in &undeclared {
                    println!(" - {}", pkg.cyan());
                }
            }
        }

        Ok(())
    }

    fn checks_declarations(&self) -> bool {
        !self.declared.is_empty() || !self.ignore.is_empty()
    }
}
