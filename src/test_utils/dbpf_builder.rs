//! Builders for DBPF containers and binary exemplars.
//!
//! Fixtures are assembled in memory, so tests never depend on real game
//! files.
//!
//! ```rust,no_run
//! use sc4pac_tools::core::Tgi;
//! use sc4pac_tools::test_utils::{DbpfBuilder, ExemplarBuilder};
//!
//! let lot = ExemplarBuilder::exemplar()
//!     .exemplar_type(0x10)
//!     .lot_object(0, 0, &[0xAABB_CCDD]);
//! let bytes = DbpfBuilder::new()
//!     .exemplar(Tgi::new(0x6534_284A, 0xA8FB_D372, 0x1), &lot)
//!     .build();
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use crate::constants::{
    GROUP_DIR, INSTANCE_DIR, PROPERTY_BUILDING_PROP_FAMILY, PROPERTY_EXEMPLAR_TYPE,
    PROPERTY_LOT_OBJECT_FIRST, TYPE_DIR,
};
use crate::core::Tgi;
use crate::dbpf::header::{HEADER_LEN, MAGIC};
use crate::dbpf::qfs;

struct PendingRecord {
    tgi: Tgi,
    data: Vec<u8>,
    compressed: bool,
    /// Size written to the index instead of the real one.
    claimed_size: Option<u32>,
}

/// Assembles a DBPF 1.0 container.
pub struct DbpfBuilder {
    records: Vec<PendingRecord>,
    index_minor: u32,
}

impl Default for DbpfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DbpfBuilder {
    /// An empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            index_minor: 0,
        }
    }

    /// Use 24-byte index entries (index minor version 2).
    #[must_use]
    pub const fn index_minor(mut self, minor: u32) -> Self {
        self.index_minor = minor;
        self
    }

    /// Add an uncompressed record.
    #[must_use]
    pub fn record(mut self, tgi: Tgi, data: Vec<u8>) -> Self {
        self.records.push(PendingRecord {
            tgi,
            data,
            compressed: false,
            claimed_size: None,
        });
        self
    }

    /// Add a QFS-compressed record listed in the DIR record.
    #[must_use]
    pub fn compressed_record(mut self, tgi: Tgi, data: Vec<u8>) -> Self {
        self.records.push(PendingRecord {
            tgi,
            data,
            compressed: true,
            claimed_size: None,
        });
        self
    }

    /// Add a record whose index entry claims `size` bytes, running past the
    /// end of the file.
    #[must_use]
    pub fn oversized_record(mut self, tgi: Tgi, size: u32) -> Self {
        self.records.push(PendingRecord {
            tgi,
            data: Vec::new(),
            compressed: false,
            claimed_size: Some(size),
        });
        self
    }

    /// Add an exemplar or cohort record, uncompressed.
    #[must_use]
    pub fn exemplar(self, tgi: Tgi, exemplar: &ExemplarBuilder) -> Self {
        self.record(tgi, exemplar.build())
    }

    /// Serialize the container.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let wide = self.index_minor == 2;
        let mut out = vec![0u8; HEADER_LEN];
        let mut index: Vec<(Tgi, u32, u32)> = Vec::new();
        let mut dir = Vec::new();

        for record in &self.records {
            let payload =
                if record.compressed { qfs::compress_literal(&record.data) } else { record.data.clone() };
            let size = record.claimed_size.unwrap_or_else(|| len_u32(payload.len()));
            index.push((record.tgi, len_u32(out.len()), size));
            out.extend_from_slice(&payload);

            if record.compressed {
                push_tgi(&mut dir, record.tgi);
                if wide {
                    dir.extend_from_slice(&0u32.to_le_bytes());
                }
                dir.extend_from_slice(&len_u32(record.data.len()).to_le_bytes());
            }
        }

        if !dir.is_empty() {
            index.push((Tgi::new(TYPE_DIR, GROUP_DIR, INSTANCE_DIR), len_u32(out.len()), len_u32(dir.len())));
            out.extend_from_slice(&dir);
        }

        let index_offset = len_u32(out.len());
        for (tgi, offset, size) in &index {
            push_tgi(&mut out, *tgi);
            if wide {
                out.extend_from_slice(&0u32.to_le_bytes());
            }
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
        }
        let index_size = len_u32(out.len()) - index_offset;

        out[0..4].copy_from_slice(MAGIC);
        put_u32(&mut out, 0x04, 1);
        put_u32(&mut out, 0x08, 0);
        put_u32(&mut out, 0x20, 7);
        put_u32(&mut out, 0x24, len_u32(index.len()));
        put_u32(&mut out, 0x28, index_offset);
        put_u32(&mut out, 0x2C, index_size);
        put_u32(&mut out, 0x3C, self.index_minor);
        out
    }

    /// Serialize the container to `path`, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.build()).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Assembles a binary exemplar (`EQZB1###`) or cohort (`CQZB1###`).
#[derive(Debug, Clone)]
pub struct ExemplarBuilder {
    cohort: bool,
    parent: Tgi,
    count: u32,
    properties: Vec<u8>,
}

impl ExemplarBuilder {
    /// An exemplar without parent or properties.
    #[must_use]
    pub const fn exemplar() -> Self {
        Self {
            cohort: false,
            parent: Tgi::new(0, 0, 0),
            count: 0,
            properties: Vec::new(),
        }
    }

    /// A cohort without parent or properties.
    #[must_use]
    pub const fn cohort() -> Self {
        Self {
            cohort: true,
            parent: Tgi::new(0, 0, 0),
            count: 0,
            properties: Vec::new(),
        }
    }

    /// Set the parent cohort.
    #[must_use]
    pub const fn parent(mut self, parent: Tgi) -> Self {
        self.parent = parent;
        self
    }

    fn header(&mut self, id: u32, value_type: u16, multi: bool) {
        self.count += 1;
        self.properties.extend_from_slice(&id.to_le_bytes());
        self.properties.extend_from_slice(&value_type.to_le_bytes());
        self.properties.extend_from_slice(&(if multi { 0x80u16 } else { 0 }).to_le_bytes());
        self.properties.push(0);
    }

    /// A single uint32 value.
    #[must_use]
    pub fn uint32(mut self, id: u32, value: u32) -> Self {
        self.header(id, 0x03, false);
        self.properties.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// A uint32 array.
    #[must_use]
    pub fn uint32_array(mut self, id: u32, values: &[u32]) -> Self {
        self.header(id, 0x03, true);
        self.properties.extend_from_slice(&len_u32(values.len()).to_le_bytes());
        for value in values {
            self.properties.extend_from_slice(&value.to_le_bytes());
        }
        self
    }

    /// A single uint8 value.
    #[must_use]
    pub fn uint8(mut self, id: u32, value: u8) -> Self {
        self.header(id, 0x01, false);
        self.properties.push(value);
        self
    }

    /// A single sint64 value.
    #[must_use]
    pub fn sint64(mut self, id: u32, value: i64) -> Self {
        self.header(id, 0x08, false);
        self.properties.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// A float32 array.
    #[must_use]
    pub fn float32_array(mut self, id: u32, values: &[f32]) -> Self {
        self.header(id, 0x09, true);
        self.properties.extend_from_slice(&len_u32(values.len()).to_le_bytes());
        for value in values {
            self.properties.extend_from_slice(&value.to_le_bytes());
        }
        self
    }

    /// A single bool value.
    #[must_use]
    pub fn bool(mut self, id: u32, value: bool) -> Self {
        self.header(id, 0x0B, false);
        self.properties.push(u8::from(value));
        self
    }

    /// A string value.
    #[must_use]
    pub fn string(mut self, id: u32, value: &str) -> Self {
        self.header(id, 0x0C, true);
        self.properties.extend_from_slice(&len_u32(value.len()).to_le_bytes());
        self.properties.extend_from_slice(value.as_bytes());
        self
    }

    /// The `ExemplarType` property.
    #[must_use]
    pub fn exemplar_type(self, exemplar_type: u32) -> Self {
        self.uint32(PROPERTY_EXEMPLAR_TYPE, exemplar_type)
    }

    /// A lot configuration object: `kind`, eleven zero placement values, then
    /// the instance ids.
    #[must_use]
    pub fn lot_object(self, slot: u32, kind: u32, iids: &[u32]) -> Self {
        let mut values = vec![kind];
        values.extend_from_slice(&[0; 11]);
        values.extend_from_slice(iids);
        self.uint32_array(PROPERTY_LOT_OBJECT_FIRST + slot, &values)
    }

    /// The building/prop family property.
    #[must_use]
    pub fn families(self, ids: &[u32]) -> Self {
        self.uint32_array(PROPERTY_BUILDING_PROP_FAMILY, ids)
    }

    /// Serialize the exemplar.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24 + self.properties.len());
        out.extend_from_slice(if self.cohort { b"CQZB1###" } else { b"EQZB1###" });
        push_tgi(&mut out, self.parent);
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.properties);
        out
    }
}

fn push_tgi(out: &mut Vec<u8>, tgi: Tgi) {
    out.extend_from_slice(&tgi.type_id.to_le_bytes());
    out.extend_from_slice(&tgi.group.to_le_bytes());
    out.extend_from_slice(&tgi.instance.to_le_bytes());
}

fn put_u32(out: &mut [u8], offset: usize, value: u32) {
    out[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
