//! The fixed 96-byte DBPF 1.x header.

use super::bytes::u32_at;

/// Size of the header in bytes.
pub const HEADER_LEN: usize = 96;

/// Magic bytes at offset 0.
pub const MAGIC: &[u8; 4] = b"DBPF";

/// Index entry size for index minor versions 0 and 1.
pub const INDEX_ENTRY_LEN: usize = 20;

/// Index entry size for index minor version 2 (adds a resource id).
pub const INDEX_ENTRY_LEN_V2: usize = 24;

/// The header fields the reader needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: u32,
    pub minor: u32,
    pub index_major: u32,
    pub index_count: u32,
    pub index_offset: u32,
    pub index_size: u32,
    pub index_minor: u32,
}

impl Header {
    /// Parse and validate the header of a fully loaded file. The error string
    /// becomes the reason of a `CorruptArchive` error.
    pub fn parse(data: &[u8]) -> Result<Self, String> {
        Self::parse_prefix(data, data.len())
    }

    /// Parse the header from the first bytes of a file of `file_len` bytes.
    pub fn parse_prefix(data: &[u8], file_len: usize) -> Result<Self, String> {
        if data.len() < HEADER_LEN || file_len < HEADER_LEN {
            return Err(format!("file is {file_len} bytes, too small for a DBPF header"));
        }
        if &data[0..4] != MAGIC {
            return Err("missing DBPF magic".to_string());
        }

        let field = |offset: usize| u32_at(data, offset).unwrap_or_default();
        let header = Self {
            major: field(0x04),
            minor: field(0x08),
            index_major: field(0x20),
            index_count: field(0x24),
            index_offset: field(0x28),
            index_size: field(0x2C),
            index_minor: field(0x3C),
        };

        if header.major != 1 {
            return Err(format!("unsupported DBPF version {}.{}", header.major, header.minor));
        }

        let table_end = header.index_table_len().checked_add(header.index_offset as usize);
        match table_end {
            Some(end) if end <= file_len => Ok(header),
            _ => Err(format!(
                "index table of {} entries at offset {} exceeds file size {file_len}",
                header.index_count, header.index_offset
            )),
        }
    }

    /// Bytes per index entry.
    #[must_use]
    pub const fn index_entry_len(&self) -> usize {
        if self.index_minor == 2 {
            INDEX_ENTRY_LEN_V2
        } else {
            INDEX_ENTRY_LEN
        }
    }

    /// Entry length of the DIR record for this container.
    #[must_use]
    pub const fn dir_entry_len(&self) -> usize {
        if self.index_minor == 2 {
            20
        } else {
            16
        }
    }

    /// Size of the index table in bytes.
    #[must_use]
    pub fn index_table_len(&self) -> usize {
        (self.index_count as usize).saturating_mul(self.index_entry_len())
    }
}
