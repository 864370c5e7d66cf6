//! The `BF` chunk, appended when a file is branched off.

use crate::cursor::Cursor;
use crate::record::DbName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFile {
    /// Offset of the previous `BF` chunk; non-zero only when the file
    /// was branched more than once.
    pub previous_offset: u32,
    /// The entity that was branched off this one.
    pub db_name: DbName,
}

pub fn read_branch(cursor: &mut Cursor) -> BranchFile {
    BranchFile {
        previous_offset: cursor.read_u32(),
        db_name: DbName::read(cursor),
    }
}
