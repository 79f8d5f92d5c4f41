//! Dependency resolution for a single `track` call.
//!
//! Resolution is an explicit work queue: each [`Job`] returns the jobs it
//! discovered, and a [`FuturesUnordered`] pool runs at most
//! `max_concurrency` of them at a time. There is no recursion, so deep
//! parent chains cost heap rather than stack.
//!
//! Every record is claimed at most once per call through the `visited` map,
//! keyed by container path and TGI. A claim is an atomic insert through the
//! `DashMap` entry API, which also makes reference cycles terminate.

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace, warn};

use super::result::{MissingKind, MissingRef, TrackingResult};
use crate::constants::{TYPE_COHORT, TYPE_EXEMPLAR};
use crate::core::{OperationContext, Sc4pacError, Tgi, TgiQuery};
use crate::dbpf::{Container, DIR_TGI, RecordHeader, read_record_at};
use crate::exemplar::Exemplar;
use crate::index::{FileIndex, IndexEntry};
use crate::package::folder_to_package_id;

/// A record within a specific container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub path: Arc<Path>,
    pub tgi: Tgi,
}

impl RecordId {
    pub fn new(path: Arc<Path>, tgi: Tgi) -> Self {
        Self {
            path,
            tgi,
        }
    }
}

/// Resolution state of a claimed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    InProgress,
    Settled,
}

/// A claimed exemplar or cohort waiting to be decoded.
#[derive(Debug)]
pub struct PendingRecord {
    path: Arc<Path>,
    header: RecordHeader,
    /// Source containers are already in memory; index entries are read from
    /// disk on demand.
    source: Option<Arc<Container>>,
}

impl PendingRecord {
    fn id(&self) -> RecordId {
        RecordId::new(Arc::clone(&self.path), self.header.tgi)
    }
}

#[derive(Debug)]
pub enum Job {
    /// Open a source file and visit all of its records.
    File(PathBuf),
    /// Decode a record and follow its references.
    Record(PendingRecord),
}

/// State of one `track` call. Discarded when the call returns.
pub struct TrackingContext<'a> {
    index: &'a FileIndex,
    sources: Vec<PathBuf>,
    max_concurrency: usize,
    visited: DashMap<RecordId, Visit>,
    touched: DashSet<Arc<Path>>,
    missing: Mutex<Vec<MissingRef>>,
    operation: OperationContext,
}

impl<'a> TrackingContext<'a> {
    pub fn new(index: &'a FileIndex, sources: Vec<PathBuf>, max_concurrency: usize) -> Self {
        Self {
            index,
            sources,
            max_concurrency: max_concurrency.max(1),
            visited: DashMap::new(),
            touched: DashSet::new(),
            missing: Mutex::new(Vec::new()),
            operation: OperationContext::new(),
        }
    }

    /// Resolve the closure of the source files.
    ///
    /// Unreadable files and undecodable records are skipped with one warning
    /// per file; they never abort the call.
    pub async fn track(self) -> TrackingResult {
        self.drain().await;
        self.into_result()
    }

    async fn drain(&self) {
        let mut queue: VecDeque<Job> = self.sources.iter().cloned().map(Job::File).collect();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.max_concurrency {
                let Some(job) = queue.pop_front() else {
                    break;
                };
                in_flight.push(self.run(job));
            }

            match in_flight.next().await {
                Some(discovered) => queue.extend(discovered),
                None => break,
            }
        }
    }

    async fn run(&self, job: Job) -> Vec<Job> {
        match job {
            Job::File(path) => self.open_source(&path).await,
            Job::Record(record) => {
                let id = record.id();
                let jobs = self.resolve_record(&record).await;
                if let Some(mut visit) = self.visited.get_mut(&id) {
                    *visit = Visit::Settled;
                }
                jobs
            }
        }
    }

    async fn open_source(&self, path: &Path) -> Vec<Job> {
        let container = match Container::open(path).await {
            Ok(container) => Arc::new(container),
            Err(e) => {
                self.warn_file(path, &e);
                return Vec::new();
            }
        };

        let file: Arc<Path> = Arc::from(path);
        self.touched.insert(Arc::clone(&file));
        debug!("Tracking {} ({} records)", path.display(), container.records().len());

        container
            .records()
            .iter()
            .filter(|header| header.tgi != DIR_TGI)
            .filter_map(|header| self.visit(&file, header, Some(&container)))
            .collect()
    }

    /// Mark a record's file as needed and claim the record.
    ///
    /// Returns a job only for newly claimed exemplars and cohorts; every
    /// other record is settled on the spot.
    fn visit(&self, path: &Arc<Path>, header: &RecordHeader, source: Option<&Arc<Container>>) -> Option<Job> {
        self.touched.insert(Arc::clone(path));

        match self.visited.entry(RecordId::new(Arc::clone(path), header.tgi)) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                if !matches!(header.tgi.type_id, TYPE_EXEMPLAR | TYPE_COHORT) {
                    slot.insert(Visit::Settled);
                    return None;
                }
                slot.insert(Visit::InProgress);
                Some(Job::Record(PendingRecord {
                    path: Arc::clone(path),
                    header: *header,
                    source: source.cloned(),
                }))
            }
        }
    }

    fn visit_entry(&self, entry: &IndexEntry) -> Option<Job> {
        self.visit(&self.index.path_arc(entry.file), &entry.header, None)
    }

    async fn resolve_record(&self, record: &PendingRecord) -> Vec<Job> {
        let bytes = match &record.source {
            Some(container) => container.read(&record.header),
            None => read_record_at(&record.path, &record.header).await,
        };
        let exemplar = match bytes.and_then(|bytes| Exemplar::decode(&bytes)) {
            Ok(exemplar) => exemplar,
            Err(e) => {
                self.warn_file(&record.path, &e);
                return Vec::new();
            }
        };
        trace!("Resolving {} in {}", record.header.tgi, record.path.display());

        let mut jobs = if exemplar.is_lot_configuration() {
            self.resolve_lot_objects(&record.path, &exemplar)
        } else {
            self.resolve_resource_keys(&record.path, &exemplar)
        };

        if exemplar.has_parent() {
            match self.index.find(&exemplar.parent) {
                Some(entry) => jobs.extend(self.visit_entry(entry)),
                None => debug!("Parent {} of {} not indexed", exemplar.parent, record.header.tgi),
            }
        }

        jobs
    }

    fn resolve_lot_objects(&self, path: &Path, exemplar: &Exemplar) -> Vec<Job> {
        let mut jobs = Vec::new();

        for object in exemplar.lot_objects() {
            for &iid in object.instance_ids() {
                if let Some(members) = self.index.family(iid) {
                    jobs.extend(members.into_iter().filter_map(|m| self.visit_entry(m)));
                    continue;
                }

                let found = self.index.find_all(&TgiQuery::instance(iid));
                if !found.is_empty() {
                    jobs.extend(found.into_iter().filter_map(|e| self.visit_entry(e)));
                    continue;
                }

                if let Some(kind) = MissingKind::for_lot_object(object.kind) {
                    self.push_missing(MissingRef {
                        kind,
                        file: path.to_path_buf(),
                        type_id: None,
                        group: None,
                        instance: iid,
                    });
                }
            }
        }

        jobs
    }

    fn resolve_resource_keys(&self, path: &Path, exemplar: &Exemplar) -> Vec<Job> {
        let mut jobs = Vec::new();

        for key in exemplar.resource_keys() {
            for tgi in key.tgis() {
                match self.index.find(tgi) {
                    Some(entry) => jobs.extend(self.visit_entry(entry)),
                    None if tgi.instance != 0 => self.push_missing(MissingRef {
                        kind: MissingKind::Model,
                        file: path.to_path_buf(),
                        type_id: Some(tgi.type_id),
                        group: Some(tgi.group),
                        instance: tgi.instance,
                    }),
                    None => {}
                }
            }
        }

        jobs
    }

    fn push_missing(&self, missing: MissingRef) {
        debug!("Missing {} {:#010x} referenced from {}", missing.kind.as_str(), missing.instance, missing.file.display());
        self.missing.lock().unwrap_or_else(PoisonError::into_inner).push(missing);
    }

    fn warn_file(&self, path: &Path, error: &Sc4pacError) {
        if self.operation.should_warn_file(path) {
            warn!("Skipping {}: {error}", path.display());
        }
    }

    fn into_result(self) -> TrackingResult {
        let mut scanned = self.sources;
        scanned.sort();
        scanned.dedup();

        let inputs: HashSet<&Path> = scanned.iter().map(PathBuf::as_path).collect();
        let mut dependencies: Vec<PathBuf> = self
            .touched
            .iter()
            .map(|file| file.key().to_path_buf())
            .filter(|file| !inputs.contains(file.as_path()))
            .collect();
        dependencies.sort();

        let packages: BTreeSet<String> =
            dependencies.iter().filter_map(|file| folder_to_package_id(file)).map(|id| id.to_string()).collect();

        let missing = self.missing.into_inner().unwrap_or_else(PoisonError::into_inner);
        debug!(
            "Tracked {} files: {} dependencies, {} packages, {} missing",
            scanned.len(),
            dependencies.len(),
            packages.len(),
            missing.len()
        );

        TrackingResult {
            scanned,
            dependencies,
            packages: packages.into_iter().collect(),
            missing,
        }
    }
}
