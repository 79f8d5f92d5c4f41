//! sc4pac package folders and package ids.
//!
//! sc4pac installs every package into its own folder below a category:
//!
//! ```text
//! Plugins/
//!   200-residential/
//!     mattb325.sunset-apartments.1.0.0.sc4pac/
//!       Sunset Apartments.SC4Lot
//! ```
//!
//! The folder name starts with `<group>.<name>`, which maps back to the
//! package id `group:name`. [`PackageIndex`] maps installed ids to folders
//! so users can pass package ids wherever a path is accepted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::constants::PACKAGE_FOLDER_SUFFIX;
use crate::core::Sc4pacError;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A validated `group:name` package id. Taken verbatim, no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageId {
    group: String,
    name: String,
}

impl PackageId {
    /// Create a package id from its halves.
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Result<Self, Sc4pacError> {
        format!("{}:{}", group.into(), name.into()).parse()
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for PackageId {
    type Err = Sc4pacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Sc4pacError::InvalidPackageId {
            id: s.to_string(),
        };

        let (group, name) = s.split_once(':').ok_or_else(invalid)?;
        if group.is_empty() || name.is_empty() || name.contains(':') || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self {
            group: group.to_string(),
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for PackageId {
    type Error = Sc4pacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageId> for String {
    fn from(id: PackageId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// The package a file or folder belongs to.
///
/// Walks `path` and its ancestors until a component ends with `.sc4pac`, then
/// takes the first two dot-separated pieces of that component as group and
/// name. `None` outside package folders.
///
/// ```rust
/// use sc4pac_tools::package::folder_to_package_id;
/// use std::path::Path;
///
/// let id = folder_to_package_id(Path::new(
///     "Plugins/200-residential/mattb325.sunset.1.0.sc4pac/Sunset.SC4Lot",
/// ));
/// assert_eq!(id.unwrap().to_string(), "mattb325:sunset");
/// ```
#[must_use]
pub fn folder_to_package_id(path: &Path) -> Option<PackageId> {
    let folder = path
        .ancestors()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .find(|name| name.ends_with(PACKAGE_FOLDER_SUFFIX))?;

    let mut pieces = folder.split('.');
    let group = pieces.next().filter(|s| !s.is_empty())?;
    let name = pieces.next().filter(|s| !s.is_empty())?;
    if name == &PACKAGE_FOLDER_SUFFIX[1..] {
        return None;
    }

    format!("{group}:{name}").parse().ok()
}

/// Whether a source argument names a package rather than a path.
///
/// Only the final path component is checked: Windows paths contain a drive
/// colon.
#[must_use]
pub fn is_package_id_input(source: &str) -> bool {
    Path::new(source).file_name().and_then(|n| n.to_str()).unwrap_or(source).contains(':')
}

/// Installed packages of a plugins folder.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: BTreeMap<PackageId, PathBuf>,
}

impl PackageIndex {
    /// Find every `<plugins>/*/*.sc4pac` folder.
    pub async fn build(plugins: &Path) -> Result<Self> {
        let plugins = plugins.to_path_buf();
        tokio::task::spawn_blocking(move || Self::scan(&plugins))
            .await
            .context("Failed to join package scan task")?
    }

    fn scan(plugins: &Path) -> Result<Self> {
        let pattern = format!(
            "{}/*/*{}",
            glob::Pattern::escape(&plugins.to_string_lossy()),
            PACKAGE_FOLDER_SUFFIX
        );

        let mut packages = BTreeMap::new();
        for folder in glob::glob(&pattern).with_context(|| format!("Invalid package pattern {pattern}"))? {
            let folder = match folder {
                Ok(folder) => folder,
                Err(e) => {
                    debug!("Skipping unreadable package folder: {e}");
                    continue;
                }
            };
            if !folder.is_dir() {
                continue;
            }
            if let Some(id) = folder_to_package_id(&folder) {
                packages.insert(id, folder);
            }
        }

        debug!("Found {} installed packages in {}", packages.len(), plugins.display());
        Ok(Self {
            packages,
        })
    }

    /// Folder of an installed package.
    #[must_use]
    pub fn resolve(&self, id: &PackageId) -> Option<&Path> {
        self.packages.get(id).map(PathBuf::as_path)
    }

    /// The installed id closest to `input`, if any is similar enough.
    #[must_use]
    pub fn suggest(&self, input: &str) -> Option<&PackageId> {
        self.packages
            .keys()
            .map(|id| (id, strsim::jaro_winkler(input, &id.to_string())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Installed packages in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageId, &Path)> {
        self.packages.iter().map(|(id, folder)| (id, folder.as_path()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
