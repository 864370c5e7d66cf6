//! Chunk framing for entity streams.
//!
//! Records inside info and data streams are framed RIFF-style, but with
//! two-letter markers instead of four-CCs:
//!
//! ```plain
//! chunk ::= size:u32 marker:u16 crc:u16 payload[size]
//! ```
//!
//! The CRC covers the payload and may be stored as zero, meaning
//! "unknown"; a zero CRC is not verified. Decoders read a fixed-layout
//! prefix of the payload and the framer advances by `size` regardless
//! of how much was consumed.

use thiserror::Error;

use crate::crc;
use crate::cursor::Cursor;

pub mod marker {
    //! Two-letter chunk markers, read as little-endian u16s.

    pub const BRANCH: u16 = 0x4642; // "BF"
    pub const CHECKOUT: u16 = 0x4643; // "CF"
    pub const CHILD: u16 = 0x504A; // "JP"
    pub const COMMENT: u16 = 0x434D; // "MC"
    pub const DATA_HEADER: u16 = 0x4844; // "DH"
    pub const DIFFERENCE: u16 = 0x4446; // "FD"
    pub const LOG_ENTRY: u16 = 0x4C45; // "EL"
    /// First chunk of names.dat; never appears in entity files.
    pub const NAME_HEADER: u16 = 0x4E48; // "HN"
    pub const PARENT_FOLDER: u16 = 0x4650; // "PF"
    /// Short-name records in names.dat; never appear in entity files.
    pub const SHORT_NAME: u16 = 0x4E53; // "SN"

    /// Renders a marker for diagnostics: the two letters when printable,
    /// the raw value otherwise.
    pub fn display(marker: u16) -> String {
        let lo = (marker & 0xFF) as u8;
        let hi = (marker >> 8) as u8;
        if lo.is_ascii_uppercase() && hi.is_ascii_uppercase() {
            format!("{}{}", lo as char, hi as char)
        } else {
            format!("{marker:#06x}")
        }
    }
}

/// One framed record, header decoded and payload still raw.
#[derive(Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Offset of the chunk header within the stream. Log-entry
    /// back-pointers and the header's first/last offsets refer to this
    /// position.
    pub offset: usize,
    pub marker: u16,
    pub stored_crc: u16,
    pub payload: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Verifies the stored CRC against the payload. `None` when they
    /// agree or when the stored CRC is zero (unknown); otherwise the
    /// `(stored, computed)` pair.
    pub fn crc_mismatch(&self) -> Option<(u16, u16)> {
        if self.stored_crc == 0 {
            return None;
        }
        let computed = crc::crc16(self.payload);
        (computed != self.stored_crc).then_some((self.stored_crc, computed))
    }

    /// A cursor over the payload, for the record decoders.
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor::new(self.payload)
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("short chunk header at offset {offset:#x}")]
    ShortHeader { offset: usize },
    #[error(
        "truncated chunk at offset {offset:#x}: header claims {claimed} bytes, {available} available"
    )]
    Truncated {
        offset: usize,
        claimed: u32,
        available: usize,
    },
}

/// Splits a stream into chunks, advancing by each chunk's stored size.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ChunkReader<'a> {
    /// Starts framing at `offset` within `data`; entity streams carry
    /// fixed-layout prefixes before their first chunk.
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// Position of the next chunk header.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reads the next chunk frame. `Ok(None)` at a clean end of stream;
    /// a trailing partial header or payload is an error.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Chunk<'a>>, FrameError> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }

        let header = self
            .data
            .get(self.offset..self.offset + 8)
            .ok_or(FrameError::ShortHeader {
                offset: self.offset,
            })?;
        let size = u32::from_le_bytes(header[0..4].try_into().unwrap());
        let marker = u16::from_le_bytes(header[4..6].try_into().unwrap());
        let stored_crc = u16::from_le_bytes(header[6..8].try_into().unwrap());

        let base = self.offset + 8;
        let payload =
            self.data
                .get(base..base + size as usize)
                .ok_or(FrameError::Truncated {
                    offset: self.offset,
                    claimed: size,
                    available: self.data.len() - base,
                })?;

        let chunk = Chunk {
            offset: self.offset,
            marker,
            stored_crc,
            payload,
        };
        self.offset = base + size as usize;
        Ok(Some(chunk))
    }
}
