//! The `PF` chunk: membership of a file in one project.
//!
//! A file gets one on creation and another each time it is shared;
//! chunks are never removed. Branching a shared link zeroes the parent
//! name instead, leaving a chunk that decodes to no reference.

use crate::cursor::Cursor;
use crate::record::DbName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentFolder {
    /// Offset of the previous `PF` chunk; zero for the first.
    pub previous_offset: u32,
    pub db_name: DbName,
}

pub fn read_parent(cursor: &mut Cursor) -> ParentFolder {
    ParentFolder {
        previous_offset: cursor.read_u32(),
        db_name: DbName::read(cursor),
    }
}
