//! Bounds-checked little-endian reader over a byte slice.
//!
//! SourceSafe's writer truncated files and left fields uninitialized
//! often enough that erroring out on every short read would get nowhere.
//! The cursor therefore never fails: a read that would run past the end
//! pins the cursor to the end and yields zeroes. Callers that care (the
//! chunk framer, the tree assembler) notice via [Cursor::remaining].

use crate::crc;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Compares the upcoming bytes against `expected` without advancing.
    pub fn test_prefix(&self, expected: &[u8]) -> bool {
        self.data[self.offset..].starts_with(expected)
    }

    /// Advances by `n` bytes. On overrun the cursor is pinned to the end
    /// and `false` is returned.
    pub fn skip(&mut self, n: usize) -> bool {
        self.read_slice(n).is_some()
    }

    pub fn read_u8(&mut self) -> u8 {
        match self.read_slice(1) {
            Some(bytes) => bytes[0],
            None => 0,
        }
    }

    pub fn read_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.read_array())
    }

    pub fn read_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.read_array())
    }

    /// Fills `out` with the next bytes. On a short read the output is
    /// zero-filled instead and `false` is returned.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> bool {
        match self.read_slice(out.len()) {
            Some(bytes) => {
                out.copy_from_slice(bytes);
                true
            }
            None => {
                out.fill(0);
                false
            }
        }
    }

    /// Reads a fixed-size array, zero-filled on a short read.
    pub fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        self.read_bytes(&mut out);
        out
    }

    /// Borrows the next `n` bytes. `None` (and a pinned cursor) on
    /// overrun.
    pub fn read_slice(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            self.offset = self.data.len();
            return None;
        }
        let start = self.offset;
        self.offset += n;
        Some(&self.data[start..start + n])
    }

    /// VSS-16 checksum of the next `n` bytes, without advancing.
    /// Out-of-range requests yield 0, the "unknown" checksum.
    pub fn compute_crc16(&self, n: usize) -> u16 {
        match self
            .offset
            .checked_add(n)
            .and_then(|end| self.data.get(self.offset..end))
        {
            Some(bytes) => crc::crc16(bytes),
            None => 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Repositions the cursor, clamping to the end of the data.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.data.len());
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}
