//! Dependency tracking.
//!
//! [`DependencyTracker`] owns the file index of a SimCity 4 installation and
//! answers "which files and packages does this plugin need?". Sources can be
//! files, folders or installed package ids:
//!
//! ```rust,no_run
//! use sc4pac_tools::tracker::{DependencyTracker, DumpOptions, TrackerOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let tracker = DependencyTracker::new(TrackerOptions::new("C:/Users/me/Documents/SimCity 4/Plugins"));
//! let result = tracker.track(&["mattb325:sunset-apartments".to_string()]).await?;
//! result.dump(&DumpOptions::default());
//! # Ok(())
//! # }
//! ```
//!
//! The index is built once per tracker, on first use, and shared by every
//! later `track` call. Each call runs a fresh [`TrackingContext`].

pub mod context;
pub mod result;

pub use context::{RecordId, TrackingContext, Visit};
pub use result::{DumpOptions, MissingKind, MissingRef, TrackingResult};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::constants::default_max_concurrency;
use crate::index::{FileIndex, IndexCache, PropFamilyPolicy, ScanRoot};
use crate::package::{PackageId, PackageIndex, is_package_id_input};
use crate::utils::fs::{absolute_path, expand_source_path};
use crate::utils::progress::spinner_with_message;

/// Where to look for plugins and how to index them.
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    /// The plugins folder. Relative sources resolve against it.
    pub plugins: PathBuf,
    /// Extra folders or files to index after the plugins folder.
    pub scan: Vec<PathBuf>,
    /// Game installation, indexed first so plugins can override it.
    pub game_dir: Option<PathBuf>,
    /// Index cache file. Written after every build when set.
    pub cache: Option<PathBuf>,
    /// Load the index from `cache` when it is fresh.
    pub use_cache: bool,
    pub max_concurrency: usize,
}

impl TrackerOptions {
    pub fn new(plugins: impl Into<PathBuf>) -> Self {
        Self {
            plugins: plugins.into(),
            scan: Vec::new(),
            game_dir: None,
            cache: None,
            use_cache: true,
            max_concurrency: default_max_concurrency(),
        }
    }

    /// The same options with every path made absolute against the current
    /// directory.
    ///
    /// Index entries and tracked sources are compared by path, so both sides
    /// must be spelled the same way.
    #[must_use]
    pub fn absolute(mut self) -> Self {
        self.plugins = absolute_path(&self.plugins);
        self.scan = self.scan.iter().map(|p| absolute_path(p)).collect();
        self.game_dir = self.game_dir.as_deref().map(absolute_path);
        self.cache = self.cache.as_deref().map(absolute_path);
        self
    }

    /// Absolute roots in override order: game, plugins, then extra scan paths.
    #[must_use]
    pub fn scan_roots(&self) -> Vec<ScanRoot> {
        let mut roots = Vec::new();
        if let Some(game_dir) = &self.game_dir {
            roots.push(ScanRoot::new(absolute_path(game_dir), 0));
        }
        roots.push(ScanRoot::new(absolute_path(&self.plugins), 1));
        for (offset, path) in self.scan.iter().enumerate() {
            let priority = i32::try_from(offset).map_or(i32::MAX, |o| o.saturating_add(2));
            roots.push(ScanRoot::new(absolute_path(path), priority));
        }
        roots
    }
}

/// Tracks plugin dependencies against a lazily built, shared index.
pub struct DependencyTracker {
    options: TrackerOptions,
    index: OnceCell<Arc<FileIndex>>,
    packages: OnceCell<PackageIndex>,
}

impl DependencyTracker {
    #[must_use]
    pub fn new(options: TrackerOptions) -> Self {
        Self {
            options: options.absolute(),
            index: OnceCell::new(),
            packages: OnceCell::new(),
        }
    }

    /// A tracker that uses an already built index.
    #[must_use]
    pub fn with_index(options: TrackerOptions, index: Arc<FileIndex>) -> Self {
        Self {
            options: options.absolute(),
            index: OnceCell::new_with(Some(index)),
            packages: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &TrackerOptions {
        &self.options
    }

    /// The file index, loading or building it on first call.
    pub async fn ensure_index(&self) -> Result<Arc<FileIndex>> {
        self.index.get_or_try_init(|| self.load_or_build_index()).await.map(Arc::clone)
    }

    async fn load_or_build_index(&self) -> Result<Arc<FileIndex>> {
        let roots = self.options.scan_roots();

        if self.options.use_cache
            && let Some(cache_path) = &self.options.cache
        {
            match IndexCache::load(cache_path, &roots).await.and_then(|cache| cache.map(FileIndex::from_cache).transpose()) {
                Ok(Some(index)) => {
                    info!("Using index cache {} ({} records)", cache_path.display(), index.len());
                    return Ok(Arc::new(index));
                }
                Ok(None) => debug!("Index cache {} is missing or stale", cache_path.display()),
                Err(e) => warn!("Ignoring index cache: {e}"),
            }
        }

        let spinner = spinner_with_message("Indexing plugins...");
        let built = FileIndex::build_with_concurrency(&roots, &PropFamilyPolicy, self.options.max_concurrency).await;
        spinner.finish_and_clear();
        let index = built.context("Failed to build plugin index")?;

        if let Some(cache_path) = &self.options.cache
            && let Err(e) = index.to_cache().save(cache_path)
        {
            warn!("Could not save index cache: {e:#}");
        }

        Ok(Arc::new(index))
    }

    /// Installed packages of the plugins folder, scanned on first call.
    pub async fn package_index(&self) -> Result<&PackageIndex> {
        self.packages.get_or_try_init(|| PackageIndex::build(&self.options.plugins)).await
    }

    /// Track files, folders and package ids.
    ///
    /// Relative paths resolve against the plugins folder. Missing paths and
    /// packages that are not installed are skipped with a warning; a
    /// malformed package id is an error.
    pub async fn track(&self, sources: &[String]) -> Result<TrackingResult> {
        let files = self.resolve_sources(sources).await?;
        self.track_files(files).await
    }

    /// Track an explicit list of container files. Relative paths resolve
    /// against the current directory.
    pub async fn track_files(&self, files: Vec<PathBuf>) -> Result<TrackingResult> {
        let files: Vec<PathBuf> = files.iter().map(|file| absolute_path(file)).collect();
        let index = self.ensure_index().await?;
        Ok(TrackingContext::new(&index, files, self.options.max_concurrency).track().await)
    }

    async fn resolve_sources(&self, sources: &[String]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for source in sources {
            if is_package_id_input(source) {
                let id: PackageId = source.parse()?;
                if let Some(folder) = self.resolve_package(&id).await? {
                    files.extend(expand_source_path(&folder)?);
                }
                continue;
            }

            let path = self.resolve_path(source);
            if !path.exists() {
                warn!("Skipping {}: no such file or directory", path.display());
                continue;
            }
            files.extend(expand_source_path(&path)?);
        }

        Ok(files)
    }

    async fn resolve_package(&self, id: &PackageId) -> Result<Option<PathBuf>> {
        let packages = self.package_index().await?;
        if let Some(folder) = packages.resolve(id) {
            return Ok(Some(folder.to_path_buf()));
        }

        match packages.suggest(&id.to_string()) {
            Some(similar) => warn!("Package {id} is not installed (did you mean {similar}?)"),
            None => warn!("Package {id} is not installed"),
        }
        Ok(None)
    }

    fn resolve_path(&self, source: &str) -> PathBuf {
        let expanded = shellexpand::tilde(source);
        let path = Path::new(expanded.as_ref());
        if path.is_absolute() {
            absolute_path(path)
        } else {
            self.options.plugins.join(path)
        }
    }
}
