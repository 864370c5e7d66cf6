//! The `JP` chunk: one entry in a project's data stream.
//!
//! Each entry points at a child entity, file or sub-project. Entries
//! stay behind for deleted children whose history is still in the
//! database, marked by the deleted flag.

use crate::cursor::Cursor;
use crate::record::{DbName, ItemName};

/// The child has been deleted, but its history is retained.
pub const CHILD_FLAG_DELETED: u16 = 1 << 0;
/// The child holds binary content.
pub const CHILD_FLAG_BINARY: u16 = 1 << 1;
/// The child is shared with at least one other project.
pub const CHILD_FLAG_SHARED: u16 = 1 << 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    /// 1 = project, 2 = file; the same values the info header uses.
    pub item_type: u16,
    pub flags: u16,
    pub name: ItemName,
    /// Reserved word between the name and the db-name; observed zero.
    pub reserved: u16,
    pub db_name: DbName,
}

impl ChildLink {
    pub fn is_deleted(&self) -> bool {
        self.flags & CHILD_FLAG_DELETED != 0
    }

    pub fn is_binary(&self) -> bool {
        self.flags & CHILD_FLAG_BINARY != 0
    }

    pub fn is_shared(&self) -> bool {
        self.flags & CHILD_FLAG_SHARED != 0
    }
}

pub fn read_child(cursor: &mut Cursor) -> ChildLink {
    let item_type = cursor.read_u16();
    let flags = cursor.read_u16();
    let name = ItemName::read(cursor);
    let reserved = cursor.read_u16();
    let db_name = DbName::read(cursor);

    ChildLink {
        item_type,
        flags,
        name,
        reserved,
        db_name,
    }
}
