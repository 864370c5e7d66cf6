//! The fixed header of an info file and the `DH` data-header chunk.
//!
//! Every info file opens with a 52-byte fixed header (magic, padding,
//! kind, format version, more padding), immediately followed by the
//! `DH` chunk. The `DH` payload repeats the kind and carries the
//! entity's display name, log-chain offsets and branch bookkeeping.

use thiserror::Error;

use crate::cursor::Cursor;
use crate::record::read_string;

/// Magic at the start of every info file. Case-sensitive.
pub const MAGIC: &[u8; 20] = b"SourceSafe@Microsoft";

/// The only file-format version this reader understands; the same value
/// is stored in `data/version.dat`. Other versions lay fields out
/// differently and are rejected.
pub const SUPPORTED_VERSION: u16 = 6;

/// Whether an entity is a folder or a versioned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Project = 1,
    File = 2,
}

impl ItemKind {
    pub fn from_u16(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(ItemKind::Project),
            2 => Some(ItemKind::File),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("missing SourceSafe magic, not an info file")]
    NotSourceSafe,
    #[error("unrecognized item kind {0}")]
    UnknownItemKind(u16),
    #[error("unsupported file version {0}, only version {SUPPORTED_VERSION} is handled")]
    UnsupportedVersion(u16),
    #[error("first chunk is {0}, expected the DH data header")]
    MissingDataHeader(String),
    #[error("info file ends inside its header")]
    Truncated,
}

/// The 52-byte fixed header at the start of an info file.
#[derive(Debug, PartialEq, Eq)]
pub struct ItemHeader {
    pub kind: ItemKind,
    pub version: u16,
    /// The two padding blocks are nominally zero; the writer does not
    /// always keep them that way.
    pub padding_nonzero: bool,
}

/// Reads the fixed header, leaving the cursor at the first chunk.
///
/// Magic, kind and version failures are unrecoverable: nothing past the
/// header can be located without them.
pub fn scan_item_header(cursor: &mut Cursor) -> Result<ItemHeader, HeaderError> {
    if !cursor.test_prefix(MAGIC) {
        return Err(HeaderError::NotSourceSafe);
    }
    cursor.skip(MAGIC.len());

    let mut padding_nonzero = false;
    for _ in 0..3 {
        padding_nonzero |= cursor.read_u32() != 0;
    }

    let raw_kind = cursor.read_u16();
    let kind = ItemKind::from_u16(raw_kind).ok_or(HeaderError::UnknownItemKind(raw_kind))?;

    let version = cursor.read_u16();
    if version != SUPPORTED_VERSION {
        return Err(HeaderError::UnsupportedVersion(version));
    }

    for _ in 0..4 {
        padding_nonzero |= cursor.read_u32() != 0;
    }

    if cursor.remaining() == 0 {
        return Err(HeaderError::Truncated);
    }

    Ok(ItemHeader {
        kind,
        version,
        padding_nonzero,
    })
}

/// Payload of the `DH` chunk.
#[derive(Debug)]
pub struct DataHeader {
    /// Repeats the fixed header's kind.
    pub kind2: u16,
    pub log_entry_count: u16,
    /// 1 for projects other than the root, 0 otherwise.
    pub has_parent: u16,
    pub name: String,
    pub short_name_offset: u32,
    /// 1 means the file has never been branched.
    pub branch_number: u16,
    /// "A" or "B": which data-file extension the writer used last.
    pub extension: [u8; 2],
    pub first_log_offset: u32,
    pub last_log_offset: u32,
    pub file_size: u32,
    /// Purpose unknown. Zero for files; observed between 0x2000 and
    /// 0x3800 for projects.
    pub counter: u16,
    pub padding_nonzero: bool,
}

pub fn read_data_header(cursor: &mut Cursor) -> DataHeader {
    let kind2 = cursor.read_u16();
    let log_entry_count = cursor.read_u16();
    let has_parent = cursor.read_u16();
    let name = read_string::<34>(cursor);
    let short_name_offset = cursor.read_u32();
    let branch_number = cursor.read_u16();
    let extension = cursor.read_array();
    let first_log_offset = cursor.read_u32();
    let last_log_offset = cursor.read_u32();
    let file_size = cursor.read_u32();
    let counter = cursor.read_u16();
    let padding: [u8; 18] = cursor.read_array();

    DataHeader {
        kind2,
        log_entry_count,
        has_parent,
        name,
        short_name_offset,
        branch_number,
        extension,
        first_log_offset,
        last_log_offset,
        file_size,
        counter,
        padding_nonzero: padding.iter().any(|&b| b != 0),
    }
}
