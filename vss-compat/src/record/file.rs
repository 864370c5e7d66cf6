//! The fixed-layout prefix of a file's info stream.
//!
//! Like the project prefix it fills the gap between the `DH` chunk and
//! offset 0x01A0, but carries checkout state, share/branch bookkeeping
//! and a 32-bit checksum of the data stream. Two large reserved blocks
//! are nominally zero; a 16-byte stretch in the middle is uninitialized
//! writer stack and carries no information at all.

use crate::cursor::Cursor;
use crate::record::DbName;

/// Set while the file is checked out, together with [FILE_FLAG_CHECKED_OUT_ALT].
pub const FILE_FLAG_CHECKED_OUT: u16 = 0x01;
/// Marks binary content.
pub const FILE_FLAG_BINARY: u16 = 0x02;
/// Observed in real databases; meaning unknown.
pub const FILE_FLAG_UNKNOWN: u16 = 0x20;
/// The writer sets both 0x01 and 0x40 on checkout.
pub const FILE_FLAG_CHECKED_OUT_ALT: u16 = 0x40;

#[derive(Debug)]
pub struct FileInfo {
    pub flags: u16,
    /// Db-name of the file this one was originally shared from; empty
    /// when the file was created directly. Survives branching.
    pub shared_from: DbName,
    pub last_branch_offset: u32,
    pub last_parent_offset: u32,
    /// Number of `BF` chunks in the info stream.
    pub branch_count: u16,
    /// Number of `PF` chunks that still name a parent. Chunks whose
    /// parent name was zeroed by a branch are not counted.
    pub parent_count: u16,
    /// 0x01A0 while checked out, else zero.
    pub checkout_active: u32,
    /// 0x01A0 while not checked out, else zero.
    pub checkout_inactive: u32,
    /// VSS-32 checksum of the data stream.
    pub data_crc: u32,
    pub last_checkin_time: u32,
    pub modified_time: u32,
    pub creation_time: u32,
    pub item_count: u16,
    pub project_count: u16,
    /// True when either reserved block carried non-zero bytes.
    pub reserved_nonzero: bool,
}

pub fn read_file_info(cursor: &mut Cursor) -> FileInfo {
    let flags = cursor.read_u16();
    let shared_from = DbName::read(cursor);
    let last_branch_offset = cursor.read_u32();
    let last_parent_offset = cursor.read_u32();
    let branch_count = cursor.read_u16();
    let parent_count = cursor.read_u16();
    let checkout_active = cursor.read_u32();
    let checkout_inactive = cursor.read_u32();
    let data_crc = cursor.read_u32();

    let reserved_a: [u8; 8] = cursor.read_array();

    let last_checkin_time = cursor.read_u32();
    let modified_time = cursor.read_u32();
    let creation_time = cursor.read_u32();

    // Uninitialized junk, frequently fragments of whatever source file
    // was being checked in.
    cursor.skip(16);

    let reserved_b: [u8; 200] = cursor.read_array();

    let item_count = cursor.read_u16();
    let project_count = cursor.read_u16();

    FileInfo {
        flags,
        shared_from,
        last_branch_offset,
        last_parent_offset,
        branch_count,
        parent_count,
        checkout_active,
        checkout_inactive,
        data_crc,
        last_checkin_time,
        modified_time,
        creation_time,
        item_count,
        project_count,
        reserved_nonzero: reserved_a.iter().chain(reserved_b.iter()).any(|&b| b != 0),
    }
}
