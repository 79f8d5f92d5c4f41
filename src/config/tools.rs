//! The `config.toml` file and its defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::default_max_concurrency;
use crate::core::Sc4pacError;
use crate::tracker::TrackerOptions;

/// Contents of `config.toml`.
///
/// Paths are stored as written and `~`-expanded when used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// The plugins folder. Defaults to `Documents/SimCity 4/Plugins`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<String>,

    /// Game installation, indexed before the plugins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_dir: Option<String>,

    /// Additional folders to index after the plugins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scan: Vec<String>,

    /// Index cache file. Without one every run scans the plugins again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
}

impl ToolsConfig {
    /// Load from the default location, or defaults if there is no file.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` (or the default location when `None`). A missing
    /// file yields the defaults.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read, isn't valid TOML, or sets
    /// `max_concurrency = 0`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.sc4pac-tools/config.toml`, or `%LOCALAPPDATA%\sc4pac-tools\config.toml`
    /// on Windows.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("sc4pac-tools")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".sc4pac-tools")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// `Documents/SimCity 4/Plugins`, where the game looks for plugins.
    pub fn default_plugins_dir() -> Result<PathBuf> {
        let documents = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| anyhow::anyhow!("Unable to determine documents directory"))?;
        Ok(documents.join("SimCity 4").join("Plugins"))
    }

    fn validate(&self) -> Result<(), Sc4pacError> {
        if self.max_concurrency == Some(0) {
            return Err(Sc4pacError::ConfigError {
                message: "max_concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The configured or default plugins folder.
    pub fn plugins_dir(&self) -> Result<PathBuf> {
        match &self.plugins {
            Some(plugins) => Ok(expand_path(plugins)),
            None => Self::default_plugins_dir(),
        }
    }

    /// The configured index cache file, if any.
    #[must_use]
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache.as_deref().map(expand_path)
    }

    /// Tracker options described by this config.
    pub fn tracker_options(&self) -> Result<TrackerOptions> {
        Ok(TrackerOptions {
            plugins: self.plugins_dir()?,
            scan: self.scan.iter().map(|p| expand_path(p)).collect(),
            game_dir: self.game_dir.as_deref().map(expand_path),
            cache: self.cache_path(),
            use_cache: true,
            max_concurrency: self.max_concurrency.unwrap_or_else(default_max_concurrency),
        })
    }
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
