//! The `EL` log-entry chunk: one user action in an entity's change log.
//!
//! Entries are chained backwards: each holds the offset of the chunk
//! before it, and the data header points at the first and last entries,
//! so the writer can append without rescanning. The record has a fixed
//! prefix and an opcode-conditional tail; decoders must branch on the
//! opcode before reading past the prefix.

use crate::cursor::Cursor;
use crate::record::{read_string, DbName, ItemName};

/// The operation a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Opcode {
    Labeled = 0,
    CreatedProject = 1,
    AddedProject = 2,
    AddedFile = 3,
    DestroyedProject = 4,
    DestroyedFile = 5,
    DeletedProject = 6,
    DeletedFile = 7,
    RecoveredProject = 8,
    RecoveredFile = 9,
    RenamedProject = 10,
    RenamedFile = 11,
    MovedProjectFrom = 12,
    MovedProjectTo = 13,
    SharedFile = 14,
    BranchedFile = 15,
    CreatedFile = 16,
    CheckedInFile = 17,
    CheckedInProject = 18,
    RolledBack = 19,
    ArchivedVersionFile = 20,
    RestoredVersionFile = 21,
    ArchivedFile = 22,
    ArchivedProject = 23,
    RestoredFile = 24,
    RestoredProject = 25,
    PinnedFile = 26,
    UnpinnedFile = 27,
}

impl Opcode {
    pub fn from_u16(raw: u16) -> Option<Self> {
        use Opcode::*;
        Some(match raw {
            0 => Labeled,
            1 => CreatedProject,
            2 => AddedProject,
            3 => AddedFile,
            4 => DestroyedProject,
            5 => DestroyedFile,
            6 => DeletedProject,
            7 => DeletedFile,
            8 => RecoveredProject,
            9 => RecoveredFile,
            10 => RenamedProject,
            11 => RenamedFile,
            12 => MovedProjectFrom,
            13 => MovedProjectTo,
            14 => SharedFile,
            15 => BranchedFile,
            16 => CreatedFile,
            17 => CheckedInFile,
            18 => CheckedInProject,
            19 => RolledBack,
            20 => ArchivedVersionFile,
            21 => RestoredVersionFile,
            22 => ArchivedFile,
            23 => ArchivedProject,
            24 => RestoredFile,
            25 => RestoredProject,
            26 => PinnedFile,
            27 => UnpinnedFile,
            _ => return None,
        })
    }
}

/// The opcode-conditional tail of a log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTail {
    /// `CheckedInFile`: the record ends after the database path; none of
    /// the name fields are present.
    CheckedIn {
        /// Offset of the `FD` chunk that reconstructs the previous
        /// version.
        difference_offset: u32,
        /// Always zero in observed databases.
        reserved: u32,
        database_path: String,
    },
    /// `RenamedFile` / `RenamedProject`: both names are present, and the
    /// new one matches the current data-header name.
    Renamed {
        name: ItemName,
        new_name: ItemName,
        reference: DbName,
    },
    /// `SharedFile`: the path of the sharing database precedes the name
    /// fields for this opcode only.
    Shared {
        database_path: String,
        name: ItemName,
        reserved: [u16; 3],
        reference: DbName,
    },
    /// `BranchedFile`: `source` names the entity this one was branched
    /// from.
    Branched {
        name: ItemName,
        reference: DbName,
        source: DbName,
    },
    /// Every other operation.
    Named { name: ItemName, reference: DbName },
}

impl LogTail {
    /// The name field, for the tails that carry one.
    pub fn name(&self) -> Option<&ItemName> {
        match self {
            LogTail::CheckedIn { .. } => None,
            LogTail::Renamed { name, .. }
            | LogTail::Shared { name, .. }
            | LogTail::Branched { name, .. }
            | LogTail::Named { name, .. } => Some(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Offset of the previous `EL` chunk; zero for the oldest entry.
    pub previous_offset: u32,
    pub raw_opcode: u16,
    /// Version numbers increase by one per entry.
    pub version: u16,
    /// Local-time `time_t` of the action.
    pub timestamp: u32,
    pub username: String,
    pub label: String,
    pub comment_offset: u32,
    pub label_offset: u32,
    pub comment_length: u16,
    pub label_length: u16,
    pub tail: LogTail,
}

impl LogEntry {
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u16(self.raw_opcode)
    }
}

pub fn read_log_entry(cursor: &mut Cursor) -> LogEntry {
    let previous_offset = cursor.read_u32();
    let raw_opcode = cursor.read_u16();
    let version = cursor.read_u16();
    let timestamp = cursor.read_u32();
    let username = read_string::<32>(cursor);
    let label = read_string::<32>(cursor);
    let comment_offset = cursor.read_u32();
    let label_offset = cursor.read_u32();
    let comment_length = cursor.read_u16();
    let label_length = cursor.read_u16();

    let tail = match Opcode::from_u16(raw_opcode) {
        Some(Opcode::CheckedInFile) => {
            let difference_offset = cursor.read_u32();
            let reserved = cursor.read_u32();
            let database_path = read_string::<260>(cursor);
            LogTail::CheckedIn {
                difference_offset,
                reserved,
                database_path,
            }
        }
        Some(Opcode::SharedFile) => {
            let database_path = read_string::<260>(cursor);
            let name = ItemName::read(cursor);
            let reserved = [cursor.read_u16(), cursor.read_u16(), cursor.read_u16()];
            let reference = DbName::read(cursor);
            LogTail::Shared {
                database_path,
                name,
                reserved,
                reference,
            }
        }
        Some(Opcode::RenamedProject | Opcode::RenamedFile) => {
            let name = ItemName::read(cursor);
            let new_name = ItemName::read(cursor);
            let reference = DbName::read(cursor);
            LogTail::Renamed {
                name,
                new_name,
                reference,
            }
        }
        Some(Opcode::BranchedFile) => {
            let name = ItemName::read(cursor);
            let reference = DbName::read(cursor);
            let source = DbName::read(cursor);
            LogTail::Branched {
                name,
                reference,
                source,
            }
        }
        // Unknown opcodes get the common shape; the caller reports them.
        _ => {
            let name = ItemName::read(cursor);
            let reference = DbName::read(cursor);
            LogTail::Named { name, reference }
        }
    };

    LogEntry {
        previous_offset,
        raw_opcode,
        version,
        timestamp,
        username,
        label,
        comment_offset,
        label_offset,
        comment_length,
        label_length,
        tail,
    }
}
