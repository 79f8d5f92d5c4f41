//! DBPF container reader.
//!
//! SimCity 4 plugins (`.dat`, `.sc4lot`, `.sc4desc`, `.sc4model`) are DBPF
//! 1.x archives: a 96-byte header, a table of record headers keyed by
//! [`Tgi`], and the record payloads. Records listed in the DIR record are
//! QFS-compressed; everything else is stored as-is.
//!
//! Two ways to read records:
//!
//! - [`Container::open`] loads the whole file once and serves any number of
//!   [`Container::read`] calls from memory. The tracker uses this for source
//!   files, where every record is visited.
//! - [`read_record_at`] reads a single record straight from disk using the
//!   location stored in a [`RecordHeader`]. The tracker uses this for records
//!   found through the [`FileIndex`](crate::index::FileIndex), so unrelated
//!   records of a large container are never loaded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sc4pac_tools::dbpf::Container;
//! use sc4pac_tools::exemplar::Exemplar;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let container = Container::open("Plugins/lot.sc4lot").await?;
//! for header in container.records() {
//!     if header.tgi.type_id == sc4pac_tools::constants::TYPE_EXEMPLAR {
//!         let exemplar = Exemplar::decode(&container.read(header)?)?;
//!         println!("{} has {} properties", header.tgi, exemplar.properties.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod bytes;
pub mod header;
pub mod qfs;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::constants::{GROUP_DIR, INSTANCE_DIR, TYPE_DIR};
use crate::core::{Sc4pacError, Tgi};
use bytes::ByteReader;
use header::Header;

/// TGI of the DIR record.
pub const DIR_TGI: Tgi = Tgi::new(TYPE_DIR, GROUP_DIR, INSTANCE_DIR);

/// Location of one record inside its container.
///
/// Doubles as the location metadata stored by the file index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Record identifier.
    pub tgi: Tgi,
    /// Byte offset of the payload in the container.
    pub offset: u32,
    /// Stored payload size.
    pub size: u32,
    /// Decompressed size from the DIR record, present iff compressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decompressed_size: Option<u32>,
}

impl RecordHeader {
    /// Whether the payload is QFS-compressed.
    #[must_use]
    pub const fn is_compressed(&self) -> bool {
        self.decompressed_size.is_some()
    }

    /// One past the last payload byte.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }
}

/// A DBPF file loaded into memory with its parsed record table.
///
/// Immutable after construction and safe to share between tasks.
#[derive(Debug)]
pub struct Container {
    path: PathBuf,
    data: Vec<u8>,
    records: Vec<RecordHeader>,
}

impl Container {
    /// Read and parse a container from disk.
    ///
    /// Fails with [`Sc4pacError::Io`] if the file can't be read and
    /// [`Sc4pacError::CorruptArchive`] if its header or tables are invalid.
    /// Record payloads are not decoded.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Sc4pacError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| Sc4pacError::io(path, e))?;
        Self::from_bytes(path, data)
    }

    /// Parse a container already held in memory.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, Sc4pacError> {
        let path = path.into();
        let header = Header::parse(&data).map_err(|reason| Sc4pacError::corrupt(&path, reason))?;

        let start = header.index_offset as usize;
        let table = &data[start..start + header.index_table_len()];
        let mut records = parse_index(&header, table)
            .map_err(|e| Sc4pacError::corrupt(&path, format!("bad index table: {e}")))?;
        check_bounds(&path, &records, data.len() as u64)?;

        if let Some(dir) = find_dir(&records) {
            let raw = slice_record(&path, &data, &dir)?;
            let sizes = parse_dir(&header, raw).map_err(|e| Sc4pacError::corrupt(&path, format!("bad DIR record: {e}")))?;
            apply_dir(&mut records, &sizes);
        }

        tracing::trace!("Opened {} with {} records", path.display(), records.len());
        Ok(Self {
            path,
            data,
            records,
        })
    }

    /// Path the container was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All record headers in index order, the DIR record included.
    #[must_use]
    pub fn records(&self) -> &[RecordHeader] {
        &self.records
    }

    /// Look up a record by exact TGI. When a container lists a TGI twice the
    /// later entry wins.
    #[must_use]
    pub fn find(&self, tgi: &Tgi) -> Option<&RecordHeader> {
        self.records.iter().rev().find(|r| r.tgi == *tgi)
    }

    /// Read a record's payload, decompressing it if needed.
    pub fn read(&self, header: &RecordHeader) -> Result<Vec<u8>, Sc4pacError> {
        let raw = slice_record(&self.path, &self.data, header)?;
        decode_payload(&self.path, header, raw)
    }
}

/// Read only the record table of a container: header, index and DIR record.
///
/// Used when indexing, where payloads are not needed.
pub async fn read_record_table(path: &Path) -> Result<Vec<RecordHeader>, Sc4pacError> {
    let io = |e| Sc4pacError::io(path, e);
    let mut file = tokio::fs::File::open(path).await.map_err(io)?;
    let file_size = file.metadata().await.map_err(io)?.len();
    let file_len = usize::try_from(file_size).unwrap_or(usize::MAX);

    let mut prefix = vec![0u8; std::cmp::min(file_len, header::HEADER_LEN)];
    file.read_exact(&mut prefix).await.map_err(io)?;
    let header = Header::parse_prefix(&prefix, file_len).map_err(|reason| Sc4pacError::corrupt(path, reason))?;

    let mut table = vec![0u8; header.index_table_len()];
    file.seek(SeekFrom::Start(u64::from(header.index_offset))).await.map_err(io)?;
    file.read_exact(&mut table).await.map_err(io)?;
    let mut records = parse_index(&header, &table)
        .map_err(|e| Sc4pacError::corrupt(path, format!("bad index table: {e}")))?;
    check_bounds(path, &records, file_size)?;

    if let Some(dir) = find_dir(&records) {
        let raw = read_record_at(path, &dir).await?;
        let sizes = parse_dir(&header, &raw).map_err(|e| Sc4pacError::corrupt(path, format!("bad DIR record: {e}")))?;
        apply_dir(&mut records, &sizes);
    }

    Ok(records)
}

fn parse_index(header: &Header, table: &[u8]) -> Result<Vec<RecordHeader>, Sc4pacError> {
    let mut reader = ByteReader::new(table);
    let wide = header.index_entry_len() == header::INDEX_ENTRY_LEN_V2;

    (0..header.index_count)
        .map(|_| -> Result<RecordHeader, Sc4pacError> {
            let tgi = Tgi::new(reader.u32()?, reader.u32()?, reader.u32()?);
            if wide {
                reader.skip(4)?;
            }
            Ok(RecordHeader {
                tgi,
                offset: reader.u32()?,
                size: reader.u32()?,
                decompressed_size: None,
            })
        })
        .collect()
}

/// Reject a table with any record outside the file, so a broken entry can
/// never shadow a good record elsewhere.
fn check_bounds(path: &Path, records: &[RecordHeader], file_len: u64) -> Result<(), Sc4pacError> {
    match records.iter().find(|r| r.end() > file_len) {
        Some(record) => Err(outside_file(path, record)),
        None => Ok(()),
    }
}

fn outside_file(path: &Path, header: &RecordHeader) -> Sc4pacError {
    Sc4pacError::corrupt(
        path,
        format!(
            "record {} at offset {} with size {} lies outside the file",
            header.tgi, header.offset, header.size
        ),
    )
}

fn find_dir(records: &[RecordHeader]) -> Option<RecordHeader> {
    records.iter().rev().find(|r| r.tgi == DIR_TGI).copied()
}

/// Decompressed sizes listed in a DIR record payload.
fn parse_dir(header: &Header, raw: &[u8]) -> Result<HashMap<Tgi, u32>, Sc4pacError> {
    let entry_len = header.dir_entry_len();
    let mut sizes = HashMap::with_capacity(raw.len() / entry_len);
    let mut reader = ByteReader::new(raw);

    while reader.remaining() >= entry_len {
        let tgi = Tgi::new(reader.u32()?, reader.u32()?, reader.u32()?);
        if entry_len == 20 {
            reader.skip(4)?;
        }
        sizes.insert(tgi, reader.u32()?);
    }
    Ok(sizes)
}

/// Mark every record listed in the DIR record as compressed.
fn apply_dir(records: &mut [RecordHeader], sizes: &HashMap<Tgi, u32>) {
    for record in records.iter_mut().filter(|r| r.tgi != DIR_TGI) {
        record.decompressed_size = sizes.get(&record.tgi).copied();
    }
}

fn slice_record<'a>(path: &Path, data: &'a [u8], header: &RecordHeader) -> Result<&'a [u8], Sc4pacError> {
    let start = header.offset as usize;
    start
        .checked_add(header.size as usize)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| outside_file(path, header))
}

/// Read one record straight from disk without loading the whole container.
///
/// The location is checked against the current file size before any buffer
/// is allocated; the file may have changed since `header` was read.
pub async fn read_record_at(path: &Path, header: &RecordHeader) -> Result<Vec<u8>, Sc4pacError> {
    let mut file = tokio::fs::File::open(path).await.map_err(|e| Sc4pacError::io(path, e))?;
    let file_len = file.metadata().await.map_err(|e| Sc4pacError::io(path, e))?.len();
    if header.end() > file_len {
        return Err(outside_file(path, header));
    }
    file.seek(SeekFrom::Start(u64::from(header.offset)))
        .await
        .map_err(|e| Sc4pacError::io(path, e))?;

    let mut raw = vec![0u8; header.size as usize];
    file.read_exact(&mut raw).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Sc4pacError::corrupt(
                path,
                format!("record {} at offset {} runs past the end of the file", header.tgi, header.offset),
            )
        } else {
            Sc4pacError::io(path, e)
        }
    })?;

    decode_payload(path, header, &raw)
}

fn decode_payload(path: &Path, header: &RecordHeader, raw: &[u8]) -> Result<Vec<u8>, Sc4pacError> {
    let Some(expected) = header.decompressed_size else {
        return Ok(raw.to_vec());
    };

    let data = qfs::decompress(raw)
        .map_err(|e| Sc4pacError::corrupt(path, format!("record {}: {e}", header.tgi)))?;

    if data.len() != expected as usize {
        return Err(Sc4pacError::corrupt(
            path,
            format!(
                "record {} decompressed to {} bytes, DIR record says {expected}",
                header.tgi,
                data.len()
            ),
        ));
    }
    Ok(data)
}
