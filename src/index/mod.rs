//! The file index: every record of every scanned plugin, keyed by TGI.
//!
//! The tracker follows references such as "instance `0x1234`" or "model
//! `T-G-I`" that can live in any file of the plugins folder. The index answers
//! those lookups without opening files: it stores, for every record, which
//! file holds it and where.
//!
//! # Building
//!
//! Scan roots are processed in ascending [`ScanRoot::priority`]; ties keep the
//! order they were given in. Within a root, files are visited in path order.
//! When two records share a TGI, the one registered later *replaces* the
//! earlier one, mirroring how the game loads plugins: the game directory
//! first, then the plugins folder, later files overriding earlier ones.
//!
//! Record tables are read concurrently but registered strictly in scan order,
//! so the result does not depend on I/O timing.
//!
//! After registration, a [`FamilyPolicy`] decides which records form families
//! (see [`FileIndex::build_families`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use sc4pac_tools::core::TgiQuery;
//! use sc4pac_tools::index::{FileIndex, PropFamilyPolicy, ScanRoot};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let roots = vec![
//!     ScanRoot::new("C:/Games/SimCity 4", 0),
//!     ScanRoot::new("C:/Users/me/Documents/SimCity 4/Plugins", 1),
//! ];
//! let index = FileIndex::build(&roots, &PropFamilyPolicy).await?;
//!
//! for entry in index.find_all(&TgiQuery::instance(0x1234_5678)) {
//!     println!("{} in {}", entry.tgi(), index.path(entry.file).display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod family;

pub use cache::IndexCache;
pub use family::{FamilyPolicy, NoFamilies, PropFamilyPolicy};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::default_max_concurrency;
use crate::core::{Tgi, TgiQuery};
use crate::dbpf::{DIR_TGI, RecordHeader, read_record_at, read_record_table};
use crate::exemplar::Exemplar;
use crate::utils::fs::collect_container_files;

/// Position of a file in the index's file table.
pub type FileId = u32;

/// A directory (scanned recursively) or single file to index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    pub path: PathBuf,
    /// Lower priorities are scanned first and can be overridden by higher ones.
    pub priority: i32,
}

impl ScanRoot {
    pub fn new(path: impl Into<PathBuf>, priority: i32) -> Self {
        Self {
            path: path.into(),
            priority,
        }
    }
}

/// One effective record: which file holds it and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub file: FileId,
    pub header: RecordHeader,
}

impl IndexEntry {
    #[must_use]
    pub const fn tgi(&self) -> Tgi {
        self.header.tgi
    }
}

/// Immutable TGI → location lookup table. Share it as `Arc<FileIndex>`.
#[derive(Debug, Default)]
pub struct FileIndex {
    roots: Vec<ScanRoot>,
    files: Vec<Arc<Path>>,
    /// Effective entries in registration order.
    entries: Vec<IndexEntry>,
    by_tgi: HashMap<Tgi, usize>,
    by_instance: HashMap<u32, Vec<usize>>,
    families: HashMap<u32, Vec<usize>>,
}

impl FileIndex {
    /// Scan `roots` and build the index, families included.
    ///
    /// Unreadable or corrupt files are skipped with a warning.
    pub async fn build(roots: &[ScanRoot], policy: &dyn FamilyPolicy) -> Result<Self> {
        Self::build_with_concurrency(roots, policy, default_max_concurrency()).await
    }

    /// [`FileIndex::build`] with an explicit bound on concurrent file reads.
    pub async fn build_with_concurrency(
        roots: &[ScanRoot],
        policy: &dyn FamilyPolicy,
        max_concurrency: usize,
    ) -> Result<Self> {
        let roots = ordered_roots(roots);
        let files = scan_files(&roots);
        debug!("Indexing {} files from {} roots", files.len(), roots.len());

        let mut registry = Registry::default();
        let mut tables = stream::iter(files)
            .map(|path| async move {
                let table = read_record_table(&path).await;
                (path, table)
            })
            .buffered(max_concurrency.max(1));

        while let Some((path, table)) = tables.next().await {
            match table {
                Ok(records) => registry.register(path, records),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }

        let mut index = registry.finish(roots);
        index.build_families_with_concurrency(policy, max_concurrency).await;

        info!(
            "Indexed {} records in {} files ({} families)",
            index.len(),
            index.file_count(),
            index.family_count()
        );
        Ok(index)
    }

    /// Rebuild the family table with `policy`.
    ///
    /// Every effective entry the policy marks eligible is read and decoded;
    /// the entry then joins each family the policy returns. Members are kept
    /// in registration order. Records that fail to decode are skipped.
    pub async fn build_families(&mut self, policy: &dyn FamilyPolicy) {
        self.build_families_with_concurrency(policy, default_max_concurrency()).await;
    }

    async fn build_families_with_concurrency(&mut self, policy: &dyn FamilyPolicy, max_concurrency: usize) {
        self.families.clear();

        let files = &self.files;
        let entries = &self.entries;
        let candidates: Vec<usize> =
            (0..entries.len()).filter(|idx| policy.is_family_eligible(&entries[*idx])).collect();

        let memberships: Vec<(usize, Vec<u32>)> = stream::iter(candidates)
            .map(|idx| async move {
                let entry = &entries[idx];
                let path = &files[entry.file as usize];
                let decoded = read_record_at(path, &entry.header).await.and_then(|bytes| Exemplar::decode(&bytes));
                match decoded {
                    Ok(exemplar) => (idx, policy.family_ids(&exemplar)),
                    Err(e) => {
                        debug!("No family for {} in {}: {e}", entry.tgi(), path.display());
                        (idx, Vec::new())
                    }
                }
            })
            .buffered(max_concurrency.max(1))
            .collect()
            .await;

        for (idx, mut ids) in memberships {
            ids.sort_unstable();
            ids.dedup();
            for id in ids {
                self.families.entry(id).or_default().push(idx);
            }
        }
    }

    /// Exact lookup.
    #[must_use]
    pub fn find(&self, tgi: &Tgi) -> Option<&IndexEntry> {
        self.by_tgi.get(tgi).map(|idx| &self.entries[*idx])
    }

    /// Partial lookup. When several entries match, the one registered last
    /// wins, consistent with override semantics.
    #[must_use]
    pub fn find_query(&self, query: &TgiQuery) -> Option<&IndexEntry> {
        if let Some(tgi) = query.as_exact() {
            return self.find(&tgi);
        }
        self.candidates(query).rev().map(|idx| &self.entries[idx]).find(|e| query.matches(&e.tgi()))
    }

    /// Every matching entry in registration order.
    #[must_use]
    pub fn find_all(&self, query: &TgiQuery) -> Vec<&IndexEntry> {
        if let Some(tgi) = query.as_exact() {
            return self.find(&tgi).into_iter().collect();
        }
        self.candidates(query).map(|idx| &self.entries[idx]).filter(|e| query.matches(&e.tgi())).collect()
    }

    fn candidates(&self, query: &TgiQuery) -> Box<dyn DoubleEndedIterator<Item = usize> + '_> {
        match query.instance {
            Some(instance) => match self.by_instance.get(&instance) {
                Some(list) => Box::new(list.iter().copied()),
                None => Box::new(std::iter::empty()),
            },
            None => Box::new(0..self.entries.len()),
        }
    }

    /// Members of family `id`, or `None` if no such family exists.
    #[must_use]
    pub fn family(&self, id: u32) -> Option<Vec<&IndexEntry>> {
        self.families.get(&id).map(|members| members.iter().map(|idx| &self.entries[*idx]).collect())
    }

    /// Path of a file in the file table.
    ///
    /// # Panics
    ///
    /// If `file` did not come from this index.
    #[must_use]
    pub fn path(&self, file: FileId) -> &Path {
        &self.files[file as usize]
    }

    /// Shared handle to a file's path.
    #[must_use]
    pub fn path_arc(&self, file: FileId) -> Arc<Path> {
        Arc::clone(&self.files[file as usize])
    }

    /// Effective entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Roots the index was built from, in scan order.
    #[must_use]
    pub fn roots(&self) -> &[ScanRoot] {
        &self.roots
    }

    /// Number of effective entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of files that were read successfully.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Assemble an index from already compacted parts.
    fn from_parts(
        roots: Vec<ScanRoot>,
        files: Vec<Arc<Path>>,
        entries: Vec<IndexEntry>,
        families: HashMap<u32, Vec<usize>>,
    ) -> Self {
        let mut by_tgi = HashMap::with_capacity(entries.len());
        let mut by_instance: HashMap<u32, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_tgi.insert(entry.tgi(), idx);
            by_instance.entry(entry.tgi().instance).or_default().push(idx);
        }

        Self {
            roots,
            files,
            entries,
            by_tgi,
            by_instance,
            families,
        }
    }
}

/// Stable sort by priority.
fn ordered_roots(roots: &[ScanRoot]) -> Vec<ScanRoot> {
    let mut ordered = roots.to_vec();
    ordered.sort_by_key(|root| root.priority);
    ordered
}

fn scan_files(roots: &[ScanRoot]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for root in roots {
        if root.path.is_file() {
            files.push(root.path.clone());
        } else if root.path.is_dir() {
            match collect_container_files(&root.path) {
                Ok(found) => files.extend(found),
                Err(e) => warn!("Skipping scan root {}: {e:#}", root.path.display()),
            }
        } else {
            warn!("Scan root {} does not exist", root.path.display());
        }
    }
    files
}

/// Registration state while building. Overridden entries leave a hole that
/// is compacted away in [`Registry::finish`].
#[derive(Default)]
struct Registry {
    files: Vec<Arc<Path>>,
    slots: Vec<Option<IndexEntry>>,
    by_tgi: HashMap<Tgi, usize>,
}

impl Registry {
    fn register(&mut self, path: PathBuf, records: Vec<RecordHeader>) {
        let Ok(file) = FileId::try_from(self.files.len()) else {
            warn!("Too many files to index; skipping {}", path.display());
            return;
        };
        self.files.push(Arc::from(path));

        for header in records.into_iter().filter(|r| r.tgi != DIR_TGI) {
            let slot = self.slots.len();
            if let Some(previous) = self.by_tgi.insert(header.tgi, slot) {
                self.slots[previous] = None;
            }
            self.slots.push(Some(IndexEntry {
                file,
                header,
            }));
        }
    }

    fn finish(self, roots: Vec<ScanRoot>) -> FileIndex {
        let entries: Vec<IndexEntry> = self.slots.into_iter().flatten().collect();
        FileIndex::from_parts(roots, self.files, entries, HashMap::new())
    }
}
