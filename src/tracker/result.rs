//! Tracking results and their text report.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::MAX_DISPLAY_PATH_LEN;
use crate::core::hex;
use crate::exemplar::LotObjectKind;

/// What kind of resource a missing reference pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKind {
    Building,
    Prop,
    Texture,
    Fence,
    Flora,
    /// A resource key (RKT) target: model, texture or icon.
    Model,
}

impl MissingKind {
    /// The kind reported for an unresolved lot object, or `None` for object
    /// kinds that are never reported.
    ///
    /// Network nodes are resolved by the game's network system; water and
    /// land constraint tiles and unknown types reference no packaged resource.
    #[must_use]
    pub const fn for_lot_object(kind: LotObjectKind) -> Option<Self> {
        match kind {
            LotObjectKind::Building => Some(Self::Building),
            LotObjectKind::Prop => Some(Self::Prop),
            LotObjectKind::Texture => Some(Self::Texture),
            LotObjectKind::Fence => Some(Self::Fence),
            LotObjectKind::Flora => Some(Self::Flora),
            LotObjectKind::Water | LotObjectKind::Land | LotObjectKind::Network | LotObjectKind::Unknown(_) => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Prop => "prop",
            Self::Texture => "texture",
            Self::Fence => "fence",
            Self::Flora => "flora",
            Self::Model => "model",
        }
    }
}

/// A reference that could not be resolved through the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRef {
    pub kind: MissingKind,
    /// File holding the referencing record.
    pub file: PathBuf,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    pub instance: u32,
}

/// Closure of a `track` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingResult {
    /// Input files, sorted and unique.
    pub scanned: Vec<PathBuf>,
    /// Files that were needed, inputs excluded, sorted.
    pub dependencies: Vec<PathBuf>,
    /// Package ids of dependency files, sorted and unique.
    pub packages: Vec<String>,
    /// Unresolved references in discovery order.
    pub missing: Vec<MissingRef>,
}

/// Which sections [`TrackingResult::render`] includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    pub packages: bool,
    pub missing: bool,
    /// List every dependency file, including those outside package folders.
    pub files: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            packages: true,
            missing: true,
            files: false,
        }
    }
}

impl TrackingResult {
    #[must_use]
    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Packages that were found but are neither declared nor ignored.
    ///
    /// Used to check a package's metadata: `declared` are the dependencies it
    /// lists, `ignore` are packages known to be pulled in on purpose.
    #[must_use]
    pub fn extra_packages(&self, declared: &[String], ignore: &[String]) -> Vec<String> {
        self.packages
            .iter()
            .filter(|pkg| !declared.contains(pkg) && !ignore.contains(pkg))
            .cloned()
            .collect()
    }

    /// Print the report to stdout.
    pub fn dump(&self, options: &DumpOptions) {
        print!("{}", self.render(options));
    }

    /// The report printed by [`TrackingResult::dump`].
    #[must_use]
    pub fn render(&self, options: &DumpOptions) -> String {
        let mut out = String::new();

        if options.packages {
            out.push_str("Dependencies (sc4pac):\n");
            for pkg in &self.packages {
                out.push_str(&format!(" - {}\n", pkg.cyan()));
            }
            out.push('\n');
        }

        if options.files {
            out.push_str("Files:\n");
            for file in &self.dependencies {
                out.push_str(&format!(" - {}\n", file.display()));
            }
            out.push('\n');
        }

        if options.missing && self.has_missing() {
            out.push_str(&format!("{}\n", "The following dependencies were not found:".red()));
            out.push_str(&self.missing_table());
        }

        out
    }

    fn missing_table(&self) -> String {
        const HEADERS: [&str; 5] = ["kind", "file", "type", "group", "instance"];

        let rows: Vec<[String; 5]> = self
            .missing
            .iter()
            .map(|m| {
                [
                    m.kind.as_str().to_string(),
                    display_path(&m.file),
                    m.type_id.map(hex).unwrap_or_default(),
                    m.group.map(hex).unwrap_or_default(),
                    hex(m.instance),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> =
            HEADERS.iter().zip(widths).map(|(h, w)| format!("{h:<w$}")).collect();
        out.push_str(&format!("{}\n", header.join(" | ").trim_end().bold()));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');
        for row in &rows {
            let cells: Vec<String> = row.iter().zip(widths).map(|(c, w)| format!("{c:<w$}")).collect();
            out.push_str(cells.join(" | ").trim_end());
            out.push('\n');
        }
        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize tracking result")
    }
}

/// Shorten long paths to their last characters.
fn display_path(path: &Path) -> String {
    let text = path.display().to_string();
    let len = text.chars().count();
    if len <= MAX_DISPLAY_PATH_LEN {
        return text;
    }
    let keep = MAX_DISPLAY_PATH_LEN - 3;
    let tail: String = text.chars().skip(len - keep).collect();
    format!("...{tail}")
}
