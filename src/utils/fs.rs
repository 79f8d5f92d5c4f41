//! File system helpers: atomic writes and container discovery.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sc4pac_tools::utils::fs::{atomic_write, collect_container_files};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let files = collect_container_files(Path::new("Plugins"))?;
//! println!("{} plugin files", files.len());
//!
//! atomic_write(Path::new("index.json"), b"{}")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::CONTAINER_EXTENSIONS;

/// Ensure a directory exists, creating parents as needed.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write `content` to a temporary sibling file, sync it, then rename it over
/// `path`. Readers never observe a half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Whether `path` has one of the DBPF container extensions
/// (`dat`, `sc4lot`, `sc4desc`, `sc4model`), compared case-insensitively.
#[must_use]
pub fn is_container_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONTAINER_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
}

/// Recursively list the container files below `dir`, sorted by path.
///
/// Symlinks are not followed. Unreadable entries are skipped with a
/// warning.
pub fn collect_container_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry below {}: {e}", dir.display());
                continue;
            }
        };
        if entry.file_type().is_file() && is_container_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} container files in {}", files.len(), dir.display());
    Ok(files)
}

/// `path` made absolute against the current directory, without resolving
/// symlinks. Returned unchanged when the current directory is unavailable.
#[must_use]
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Expand a source path into container files: directories recursively, files
/// as themselves.
pub fn expand_source_path(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        collect_container_files(path)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        anyhow::bail!("No such file or directory: {}", path.display())
    }
}
