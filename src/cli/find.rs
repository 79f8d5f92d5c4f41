//! Index diagnostics: which file provides a TGI.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::TrackerArgs;
use crate::config::ToolsConfig;
use crate::core::{Sc4pacError, Tgi, TgiQuery, hex, parse_hex_u32};
use crate::tracker::DependencyTracker;

#[derive(Debug, Args)]
pub struct FindCommand {
    /// Exact TGI as `type-group-instance` in hex
    #[arg(value_name = "TGI", required_unless_present = "instance", conflicts_with = "instance")]
    pub tgi: Option<String>,

    /// Every record with this instance id, plus the family of that id
    #[arg(long, value_name = "HEX")]
    pub instance: Option<String>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

impl FindCommand {
    pub async fn execute(self, config: &ToolsConfig) -> Result<()> {
        let query = self.query()?;
        let tracker = DependencyTracker::new(self.tracker.to_options(config)?);
        let index = tracker.ensure_index().await?;

        let entries = index.find_all(&query);
        if entries.is_empty() {
            println!("{}", "No matching records".yellow());
        }
        for entry in entries {
            println!("{}  {}", entry.tgi().to_string().cyan(), index.path(entry.file).display());
        }

        if let Some(instance) = query.instance
            && query.type_id.is_none()
            && let Some(members) = index.family(instance)
        {
            println!("{}", format!("Family {}:", hex(instance)).bold());
            for member in members {
                println!("  {}  {}", member.tgi().to_string().cyan(), index.path(member.file).display());
            }
        }

        Ok(())
    }

    fn query(&self) -> Result<TgiQuery, Sc4pacError> {
        if let Some(tgi) = &self.tgi {
            return Ok(TgiQuery::from(tgi.parse::<Tgi>()?));
        }

        let raw = self.instance.as_deref().unwrap_or_default();
        parse_hex_u32(raw).map(TgiQuery::instance).ok_or_else(|| Sc4pacError::InvalidTgi {
            input: raw.to_string(),
        })
    }
}
