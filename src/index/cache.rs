//! JSON persistence for the file index.
//!
//! Scanning a large plugins folder reads thousands of record tables. The
//! cache stores the finished index (files, effective entries, families) so
//! later runs can skip the scan.
//!
//! A cache is only valid for the roots it was built from: [`IndexCache::load`]
//! compares a SHA-256 digest of the scan roots and treats a mismatch, or a
//! different [`format_version`](IndexCache::format_version), as a miss. It
//! does not notice plugins that changed on disk; rebuild with
//! `sc4pac-tools index --rebuild` after installing or removing packages.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{FileIndex, IndexEntry, ScanRoot, ordered_roots};
use crate::constants::INDEX_CACHE_FORMAT_VERSION;
use crate::core::Sc4pacError;
use crate::utils::fs::atomic_write;

/// Serialized form of a [`FileIndex`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexCache {
    pub format_version: u32,
    pub built_at: DateTime<Utc>,
    /// Roots in scan order.
    pub roots: Vec<ScanRoot>,
    /// SHA-256 (hex) of the roots, see [`roots_digest`].
    pub roots_digest: String,
    pub files: Vec<PathBuf>,
    pub entries: Vec<IndexEntry>,
    /// Family id → positions in `entries`.
    pub families: BTreeMap<u32, Vec<usize>>,
}

impl IndexCache {
    /// Load a cache built for `expected_roots`.
    ///
    /// Returns `Ok(None)` when the file doesn't exist, was written by another
    /// format version, or was built for other roots. Unreadable or malformed
    /// files are errors.
    pub async fn load(path: &Path, expected_roots: &[ScanRoot]) -> Result<Option<Self>, Sc4pacError> {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No index cache at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(Sc4pacError::io(path, e)),
        };

        let cache: Self = serde_json::from_slice(&data).map_err(|e| Sc4pacError::IndexCache {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if cache.format_version != INDEX_CACHE_FORMAT_VERSION {
            debug!(
                "Ignoring index cache {}: format version {} != {}",
                path.display(),
                cache.format_version,
                INDEX_CACHE_FORMAT_VERSION
            );
            return Ok(None);
        }

        if cache.roots_digest != roots_digest(expected_roots) {
            debug!("Ignoring index cache {}: built for other scan roots", path.display());
            return Ok(None);
        }

        cache.validate().map_err(|reason| Sc4pacError::IndexCache {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!("Loaded index cache {} built at {}", path.display(), cache.built_at);
        Ok(Some(cache))
    }

    /// Write the cache atomically.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let data = serde_json::to_vec(self).context("Failed to serialize index cache")?;
        atomic_write(path, &data).with_context(|| format!("Failed to write index cache {}", path.display()))?;
        debug!("Wrote index cache {} ({} entries)", path.display(), self.entries.len());
        Ok(())
    }

    /// Check that every reference points inside its table.
    fn validate(&self) -> Result<(), String> {
        if let Some(entry) = self.entries.iter().find(|e| e.file as usize >= self.files.len()) {
            return Err(format!("entry {} references missing file #{}", entry.tgi(), entry.file));
        }
        for (family, members) in &self.families {
            if members.iter().any(|idx| *idx >= self.entries.len()) {
                return Err(format!("family {family:#010x} references a missing entry"));
            }
        }
        Ok(())
    }
}

/// SHA-256 hex digest of the scan roots in scan order.
///
/// Two root lists that scan the same paths in the same order share a digest.
#[must_use]
pub fn roots_digest(roots: &[ScanRoot]) -> String {
    let mut hasher = Sha256::new();
    for root in ordered_roots(roots) {
        hasher.update(root.priority.to_le_bytes());
        hasher.update(root.path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

impl FileIndex {
    /// Snapshot the index for [`IndexCache::save`].
    #[must_use]
    pub fn to_cache(&self) -> IndexCache {
        IndexCache {
            format_version: INDEX_CACHE_FORMAT_VERSION,
            built_at: Utc::now(),
            roots: self.roots.clone(),
            roots_digest: roots_digest(&self.roots),
            files: self.files.iter().map(|f| f.to_path_buf()).collect(),
            entries: self.entries.clone(),
            families: self.families.iter().map(|(id, members)| (*id, members.clone())).collect(),
        }
    }

    /// Rebuild an index from a cache without touching the plugins folder.
    pub fn from_cache(cache: IndexCache) -> Result<Self, Sc4pacError> {
        cache.validate().map_err(Sc4pacError::decode)?;

        let files: Vec<Arc<Path>> = cache.files.into_iter().map(Arc::from).collect();
        let families: HashMap<u32, Vec<usize>> = cache.families.into_iter().collect();
        Ok(Self::from_parts(cache.roots, files, cache.entries, families))
    }
}
