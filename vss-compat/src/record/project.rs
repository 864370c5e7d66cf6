//! The fixed-layout prefix of a project's info stream.
//!
//! It sits between the `DH` chunk and the first framed chunk at 0x01A0,
//! and names the containing project both as a display path and as a
//! physical db-name. Both are empty for the root of the database.

use crate::cursor::Cursor;
use crate::record::{read_string, DbName};

#[derive(Debug)]
pub struct ProjectInfo {
    /// Path of the containing project inside the database, starting
    /// with `$/`; empty for the root.
    pub parent_path: String,
    /// Physical name of the containing project; empty for the root.
    pub parent_db_name: DbName,
    /// Number of child links in the data stream, deleted ones included.
    pub child_count: u16,
    /// How many of the children are sub-projects.
    pub project_count: u16,
}

pub fn read_project_info(cursor: &mut Cursor) -> ProjectInfo {
    let parent_path = read_string::<260>(cursor);
    let parent_db_name = DbName::read(cursor);
    // The parent name field is 12 bytes, NUL-padded past the name.
    cursor.skip(2);
    let child_count = cursor.read_u16();
    let project_count = cursor.read_u16();

    ProjectInfo {
        parent_path,
        parent_db_name,
        child_count,
        project_count,
    }
}
