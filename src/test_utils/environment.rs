//! Temporary plugins folder for library and integration tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::dbpf_builder::DbpfBuilder;

/// A temporary directory holding a `Plugins` folder laid out the way sc4pac
/// installs packages: `<plugins>/<category>/<group>.<name>.<version>.sc4pac/`.
pub struct TestPlugins {
    pub temp_dir: TempDir,
    pub plugins_dir: PathBuf,
}

impl TestPlugins {
    /// Create an empty plugins folder.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let plugins_dir = temp_dir.path().join("Plugins");
        fs::create_dir_all(&plugins_dir)?;

        Ok(Self {
            temp_dir,
            plugins_dir,
        })
    }

    /// Create (if needed) and return an installed package folder.
    pub fn package_dir(&self, category: &str, group: &str, name: &str) -> Result<PathBuf> {
        let dir = self.plugins_dir.join(category).join(format!("{group}.{name}.1.0.0.sc4pac"));
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(dir)
    }

    /// Write a container into an installed package folder.
    pub fn write_package_file(
        &self,
        category: &str,
        package: &str,
        file_name: &str,
        builder: &DbpfBuilder,
    ) -> Result<PathBuf> {
        let (group, name) = package.split_once(':').context("package id must be group:name")?;
        let path = self.package_dir(category, group, name)?.join(file_name);
        builder.write_to(&path)?;
        Ok(path)
    }

    /// Write a container at a path relative to the plugins folder.
    pub fn write_file(&self, relative: impl AsRef<Path>, builder: &DbpfBuilder) -> Result<PathBuf> {
        let path = self.plugins_dir.join(relative);
        builder.write_to(&path)?;
        Ok(path)
    }

    /// Write raw bytes at a path relative to the plugins folder.
    pub fn write_raw(&self, relative: impl AsRef<Path>, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.plugins_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// A directory next to the plugins folder, e.g. for a fake game install.
    pub fn sibling_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.temp_dir.path().join(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
