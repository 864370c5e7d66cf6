//! Findings accumulated while decoding and auditing a database.

use std::fmt;

use thiserror::Error;

use tracing::warn;

/// A single integrity problem. These are observations, not failures:
/// the walk keeps going after recording one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Finding {
    #[error("{entity}: bad CRC in {marker} chunk at {offset:#x}: stored {stored:#06x}, computed {computed:#06x}")]
    ChunkCrcMismatch {
        entity: String,
        marker: String,
        offset: usize,
        stored: u16,
        computed: u16,
    },

    #[error("{entity}: data stream checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    DataCrcMismatch {
        entity: String,
        stored: u32,
        computed: u32,
    },

    #[error("{entity}: {stream} stream cut short: {detail}")]
    TruncatedStream {
        entity: String,
        stream: &'static str,
        detail: String,
    },

    #[error("{entity}: unknown chunk marker {marker} at {offset:#x}")]
    UnknownMarker {
        entity: String,
        marker: String,
        offset: usize,
    },

    #[error("{entity}: header kind {header} disagrees with data-header kind {chunk}")]
    KindMismatch {
        entity: String,
        header: u16,
        chunk: u16,
    },

    #[error("{entity}: unknown opcode {opcode} in log entry at {offset:#x}")]
    UnknownOpcode {
        entity: String,
        opcode: u16,
        offset: usize,
    },

    #[error("{entity}: expected {expected} {what}, found {found}")]
    CountMismatch {
        entity: String,
        what: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("{entity}: {projects} sub-projects claimed but only {children} children")]
    ProjectCountExceedsChildren {
        entity: String,
        projects: u16,
        children: u16,
    },

    #[error("{entity}: {what} reference {id} is outside the entity table")]
    ReferenceOutOfRange {
        entity: String,
        what: &'static str,
        id: u64,
    },

    #[error("{entity}: {what} reference {raw:?} does not decode to an entity")]
    InvalidReference {
        entity: String,
        what: &'static str,
        raw: String,
    },

    #[error("{entity}: {stream} stream is missing")]
    MissingStream {
        entity: String,
        stream: &'static str,
    },

    #[error("{entity}: checkout flag {flag:#06x} is neither 0 nor 0x40")]
    UnexpectedCheckoutFlag { entity: String, flag: u16 },

    #[error("{entity}: checkout offsets active={active:#x} inactive={inactive:#x}, expected one of them at 0x1a0 and the other zero")]
    CheckoutOffsets {
        entity: String,
        active: u32,
        inactive: u32,
    },

    #[error("{entity}: name flags {flags:#06x} for {name:?} are none of 0, 1, 0x033c")]
    UnexpectedNameFlags {
        entity: String,
        flags: u16,
        name: String,
    },

    #[error("{entity}: {field} carries non-zero reserved bytes")]
    ReservedNonzero {
        entity: String,
        field: &'static str,
    },

    #[error("{entity}: log chain: {detail}")]
    LogChain { entity: String, detail: String },

    #[error("{entity}: difference script at {offset:#x} has no halt opcode")]
    UnterminatedDelta { entity: String, offset: usize },
}

/// Everything a scan learned that is worth surfacing, fatal errors
/// aside.
#[derive(Debug, Default)]
pub struct Report {
    pub findings: Vec<Finding>,
    pub info_files: u32,
    pub data_files: u32,
    /// Total bytes held resident for the scan.
    pub byte_size: u64,
    /// Entities reached from the root.
    pub visited: u32,
    /// Identifiers with no info file: removed from the database once
    /// the last project referencing them was destroyed.
    pub unallocated: u32,
    /// Entities with an info file that no project references, kept for
    /// history. Identifier and physical name.
    pub orphans: Vec<(u32, String)>,
}

impl Report {
    pub(crate) fn push(&mut self, finding: Finding) {
        warn!("{finding}");
        self.findings.push(finding);
    }

    /// True when the scan saw nothing suspicious. Orphans and
    /// unallocated slots are normal and do not count.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "info files:    {}", self.info_files)?;
        writeln!(f, "data files:    {}", self.data_files)?;
        writeln!(f, "memory size:   {}", self.byte_size)?;
        writeln!(f, "visited:       {}", self.visited)?;
        writeln!(f, "not allocated: {}", self.unallocated)?;
        writeln!(f, "not visited:   {}", self.orphans.len())?;
        for (id, name) in &self.orphans {
            writeln!(f, "skipped: {id} {name}")?;
        }
        for finding in &self.findings {
            writeln!(f, "problem: {finding}")?;
        }
        Ok(())
    }
}
