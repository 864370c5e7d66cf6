//! Walking the project graph.
//!
//! Assembly starts at entity 0, the root project, and recurses through
//! child links depth-first. A shared file is reachable from several
//! projects; the first visit decodes it and later visits return early,
//! which also stops reference loops in malformed databases. Parent and
//! share references may point at entities the walk has not reached yet,
//! so nothing here depends on visiting order.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::report::{Finding, Report};
use super::{NodeKind, Tree};
use crate::base26::NameDecodeError;
use crate::chunk::{marker, Chunk, ChunkReader};
use crate::crc;
use crate::cursor::Cursor;
use crate::record::{
    self, delta, DataHeader, HeaderError, ItemKind, ItemName, LogEntry, LogTail, CHECKOUT_OFFSET,
};

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("the root project (entity 0) is missing")]
    MissingRoot,

    #[error("entity {id} ({name}): {source}")]
    BadHeader {
        id: u32,
        name: String,
        #[source]
        source: HeaderError,
    },
}

/// What one entity decoded to, before the table is updated.
struct Decoded {
    kind: NodeKind,
    parent: Option<u32>,
    path: String,
    children: Vec<u32>,
}

impl Tree {
    /// Walks the tree from the root project, decoding every reachable
    /// entity and recording anomalies in `report`.
    pub fn assemble(&mut self, report: &mut Report) -> Result<(), AssembleError> {
        let root_ok = self
            .node(0)
            .is_some_and(|n| n.info.is_some() && n.data.is_some());
        if !root_ok {
            return Err(AssembleError::MissingRoot);
        }
        self.visit(0, "", report)
    }

    fn visit(
        &mut self,
        id: u32,
        parent_path: &str,
        report: &mut Report,
    ) -> Result<(), AssembleError> {
        // Already decoded via another project.
        if self.nodes[id as usize].is_visited() {
            return Ok(());
        }

        let name = crate::base26::encode(id as u64);
        let node = &self.nodes[id as usize];
        let Some(info) = node.info.as_deref() else {
            report.push(Finding::MissingStream {
                entity: name,
                stream: "info",
            });
            return Ok(());
        };

        let decoded = decode_entity(
            id,
            &name,
            info,
            node.data.as_deref(),
            parent_path,
            self.nodes.len(),
            report,
        )?;
        debug!(id, path = %decoded.path, kind = ?decoded.kind, "visited");

        let node = &mut self.nodes[id as usize];
        node.kind = decoded.kind;
        node.parent = decoded.parent;
        report.visited += 1;

        for child in decoded.children {
            self.visit(child, &decoded.path, report)?;
        }
        Ok(())
    }
}

/// Decodes both streams of one entity. Pure with respect to the table;
/// the caller applies the result.
fn decode_entity(
    id: u32,
    name: &str,
    info: &[u8],
    data: Option<&[u8]>,
    parent_path: &str,
    table_len: usize,
    report: &mut Report,
) -> Result<Decoded, AssembleError> {
    let mut cursor = Cursor::new(info);
    let header = record::scan_item_header(&mut cursor).map_err(|source| {
        AssembleError::BadHeader {
            id,
            name: name.to_owned(),
            source,
        }
    })?;
    if header.padding_nonzero {
        report.push(Finding::ReservedNonzero {
            entity: name.to_owned(),
            field: "info header padding",
        });
    }

    let mut chunks = ChunkReader::new(info, cursor.offset());
    let dh_chunk = match chunks.next() {
        Ok(Some(chunk)) => chunk,
        Ok(None) | Err(_) => {
            return Err(AssembleError::BadHeader {
                id,
                name: name.to_owned(),
                source: HeaderError::Truncated,
            })
        }
    };
    check_chunk_crc(name, &dh_chunk, report);
    if dh_chunk.marker != marker::DATA_HEADER {
        return Err(AssembleError::BadHeader {
            id,
            name: name.to_owned(),
            source: HeaderError::MissingDataHeader(marker::display(dh_chunk.marker)),
        });
    }
    let dh = record::read_data_header(&mut dh_chunk.cursor());

    if dh.kind2 != header.kind as u16 {
        report.push(Finding::KindMismatch {
            entity: name.to_owned(),
            header: header.kind as u16,
            chunk: dh.kind2,
        });
    }
    if dh.padding_nonzero {
        report.push(Finding::ReservedNonzero {
            entity: name.to_owned(),
            field: "data header padding",
        });
    }

    let path = if parent_path.is_empty() {
        dh.name.clone()
    } else {
        format!("{parent_path}\\{}", dh.name)
    };

    // The kind-specific prefix follows the data-header chunk; the first
    // framed chunk after it sits at 0x1a0.
    let mut prefix = Cursor::new(info);
    prefix.set_offset(chunks.offset());

    Ok(match header.kind {
        ItemKind::Project => {
            decode_project(name, info, data, prefix, &dh, path, table_len, report)
        }
        ItemKind::File => decode_file(name, info, data, prefix, &dh, path, table_len, report),
    })
}

#[allow(clippy::too_many_arguments)]
fn decode_project(
    name: &str,
    info: &[u8],
    data: Option<&[u8]>,
    mut prefix: Cursor,
    dh: &DataHeader,
    path: String,
    table_len: usize,
    report: &mut Report,
) -> Decoded {
    let pi = record::read_project_info(&mut prefix);

    let parent = match pi.parent_db_name.decode() {
        Ok(pid) if (pid as usize) < table_len => Some(pid as u32),
        Ok(pid) => {
            report.push(Finding::ReferenceOutOfRange {
                entity: name.to_owned(),
                what: "parent",
                id: pid,
            });
            None
        }
        // The root project has no parent.
        Err(NameDecodeError::Empty) => None,
        Err(_) => {
            report.push(Finding::InvalidReference {
                entity: name.to_owned(),
                what: "parent",
                raw: pi.parent_db_name.as_bstr().to_string(),
            });
            None
        }
    };

    if pi.project_count > pi.child_count {
        report.push(Finding::ProjectCountExceedsChildren {
            entity: name.to_owned(),
            projects: pi.project_count,
            children: pi.child_count,
        });
    }

    // Info stream: the change log, with a comment chunk per operation
    // that carries one.
    let mut log = LogCollector::default();
    let mut chunks = ChunkReader::new(info, prefix.offset());
    loop {
        match chunks.next() {
            Ok(Some(chunk)) => {
                check_chunk_crc(name, &chunk, report);
                match chunk.marker {
                    marker::COMMENT => {
                        let comment = record::read_comment(chunk.payload);
                        debug!(entity = name, offset = chunk.offset, %comment, "comment");
                    }
                    marker::LOG_ENTRY => {
                        let entry = record::read_log_entry(&mut chunk.cursor());
                        log.push(&chunk, &entry);
                        check_log_entry(name, &chunk, &entry, report);
                    }
                    other => report.push(Finding::UnknownMarker {
                        entity: name.to_owned(),
                        marker: marker::display(other),
                        offset: chunk.offset,
                    }),
                }
            }
            Ok(None) => break,
            Err(e) => {
                report.push(Finding::TruncatedStream {
                    entity: name.to_owned(),
                    stream: "info",
                    detail: e.to_string(),
                });
                break;
            }
        }
    }
    log.verify(name, dh, report);

    // Data stream: one child link per entry, deleted ones included.
    let mut children = Vec::new();
    let mut child_links: u32 = 0;
    let mut child_projects: u32 = 0;
    match data {
        None => report.push(Finding::MissingStream {
            entity: name.to_owned(),
            stream: "data",
        }),
        Some(data) => {
            let mut chunks = ChunkReader::new(data, 0);
            loop {
                match chunks.next() {
                    Ok(Some(chunk)) => {
                        check_chunk_crc(name, &chunk, report);
                        match chunk.marker {
                            marker::CHILD => {
                                let child = record::read_child(&mut chunk.cursor());
                                child_links += 1;
                                if child.item_type == ItemKind::Project as u16 {
                                    child_projects += 1;
                                }
                                if child.reserved != 0 {
                                    report.push(Finding::ReservedNonzero {
                                        entity: name.to_owned(),
                                        field: "child link",
                                    });
                                }
                                check_name_flags(name, &child.name, report);
                                match child.db_name.decode() {
                                    Ok(cid) if (cid as usize) < table_len => {
                                        children.push(cid as u32)
                                    }
                                    Ok(cid) => report.push(Finding::ReferenceOutOfRange {
                                        entity: name.to_owned(),
                                        what: "child",
                                        id: cid,
                                    }),
                                    // Destroyed children keep their link but
                                    // lose the reference; the target shows up
                                    // as unused in the audit if it survives.
                                    Err(NameDecodeError::Empty) => {
                                        debug!(
                                            entity = name,
                                            child = %child.name.name,
                                            "child link with no reference"
                                        );
                                    }
                                    Err(_) => report.push(Finding::InvalidReference {
                                        entity: name.to_owned(),
                                        what: "child",
                                        raw: child.db_name.as_bstr().to_string(),
                                    }),
                                }
                            }
                            other => report.push(Finding::UnknownMarker {
                                entity: name.to_owned(),
                                marker: marker::display(other),
                                offset: chunk.offset,
                            }),
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        report.push(Finding::TruncatedStream {
                            entity: name.to_owned(),
                            stream: "data",
                            detail: e.to_string(),
                        });
                        break;
                    }
                }
            }

            if child_links != pi.child_count as u32 {
                report.push(Finding::CountMismatch {
                    entity: name.to_owned(),
                    what: "child links",
                    expected: pi.child_count as u32,
                    found: child_links,
                });
            }
            if child_projects != pi.project_count as u32 {
                report.push(Finding::CountMismatch {
                    entity: name.to_owned(),
                    what: "sub-projects",
                    expected: pi.project_count as u32,
                    found: child_projects,
                });
            }
        }
    }

    Decoded {
        kind: NodeKind::Project,
        parent,
        path,
        children,
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_file(
    name: &str,
    info: &[u8],
    data: Option<&[u8]>,
    mut prefix: Cursor,
    dh: &DataHeader,
    path: String,
    table_len: usize,
    report: &mut Report,
) -> Decoded {
    let fi = record::read_file_info(&mut prefix);

    if fi.reserved_nonzero {
        report.push(Finding::ReservedNonzero {
            entity: name.to_owned(),
            field: "file info prefix",
        });
    }
    if dh.counter != 0 {
        report.push(Finding::ReservedNonzero {
            entity: name.to_owned(),
            field: "data-header counter",
        });
    }
    if fi.project_count > fi.item_count {
        report.push(Finding::ProjectCountExceedsChildren {
            entity: name.to_owned(),
            projects: fi.project_count,
            children: fi.item_count,
        });
    }

    // The data stream holds the current content, protected by the
    // 32-bit checksum in the prefix.
    match data {
        Some(data) => {
            let computed = crc::crc32(data);
            if computed != fi.data_crc {
                report.push(Finding::DataCrcMismatch {
                    entity: name.to_owned(),
                    stored: fi.data_crc,
                    computed,
                });
            }
        }
        None => report.push(Finding::MissingStream {
            entity: name.to_owned(),
            stream: "data",
        }),
    }

    let mut log = LogCollector::default();
    let mut branch_found: u32 = 0;
    let mut parent_found: u32 = 0;
    let mut saw_checkout = false;

    let mut chunks = ChunkReader::new(info, prefix.offset());
    loop {
        match chunks.next() {
            Ok(Some(chunk)) => {
                check_chunk_crc(name, &chunk, report);
                match chunk.marker {
                    marker::BRANCH => {
                        let branch = record::read_branch(&mut chunk.cursor());
                        branch_found += 1;
                        debug!(
                            entity = name,
                            branched_to = ?branch.db_name,
                            "branch record"
                        );
                    }
                    marker::CHECKOUT => {
                        let checkout = record::read_checkout(&mut chunk.cursor());
                        saw_checkout = true;
                        if !checkout.flag_expected() {
                            report.push(Finding::UnexpectedCheckoutFlag {
                                entity: name.to_owned(),
                                flag: checkout.checkout_flag,
                            });
                        }
                        if checkout.next_checkout != 0 {
                            report.push(Finding::ReservedNonzero {
                                entity: name.to_owned(),
                                field: "checkout chain pointer",
                            });
                        }
                        let flags = (checkout.flag1, checkout.flag2);
                        if flags != (CHECKOUT_OFFSET as u16, 0x1000) && flags != (0, 0) {
                            // Known to wander; record, never enforce.
                            debug!(
                                entity = name,
                                flag1 = checkout.flag1,
                                flag2 = checkout.flag2,
                                "checkout flag words outside the usual pair"
                            );
                        }
                    }
                    marker::COMMENT => {
                        let comment = record::read_comment(chunk.payload);
                        debug!(entity = name, offset = chunk.offset, %comment, "comment");
                    }
                    marker::DIFFERENCE => {
                        let script = delta::read_delta(&mut chunk.cursor());
                        if !script.terminated {
                            report.push(Finding::UnterminatedDelta {
                                entity: name.to_owned(),
                                offset: chunk.offset,
                            });
                        }
                    }
                    marker::LOG_ENTRY => {
                        let entry = record::read_log_entry(&mut chunk.cursor());
                        log.push(&chunk, &entry);
                        check_log_entry(name, &chunk, &entry, report);
                    }
                    marker::PARENT_FOLDER => {
                        let parent = record::read_parent(&mut chunk.cursor());
                        match parent.db_name.decode() {
                            Ok(pid) => {
                                parent_found += 1;
                                if pid as usize >= table_len {
                                    report.push(Finding::ReferenceOutOfRange {
                                        entity: name.to_owned(),
                                        what: "parent folder",
                                        id: pid,
                                    });
                                }
                            }
                            // Zeroed out when the share was branched off.
                            Err(NameDecodeError::Empty) => {}
                            Err(_) => report.push(Finding::InvalidReference {
                                entity: name.to_owned(),
                                what: "parent folder",
                                raw: parent.db_name.as_bstr().to_string(),
                            }),
                        }
                    }
                    other => report.push(Finding::UnknownMarker {
                        entity: name.to_owned(),
                        marker: marker::display(other),
                        offset: chunk.offset,
                    }),
                }
            }
            Ok(None) => break,
            Err(e) => {
                report.push(Finding::TruncatedStream {
                    entity: name.to_owned(),
                    stream: "info",
                    detail: e.to_string(),
                });
                break;
            }
        }
    }

    if branch_found != fi.branch_count as u32 {
        report.push(Finding::CountMismatch {
            entity: name.to_owned(),
            what: "branch chunks",
            expected: fi.branch_count as u32,
            found: branch_found,
        });
    }
    if parent_found != fi.parent_count as u32 {
        report.push(Finding::CountMismatch {
            entity: name.to_owned(),
            what: "parent chunks",
            expected: fi.parent_count as u32,
            found: parent_found,
        });
    }
    if saw_checkout {
        let offsets_ok = (fi.checkout_active == 0 && fi.checkout_inactive == CHECKOUT_OFFSET)
            || (fi.checkout_active == CHECKOUT_OFFSET && fi.checkout_inactive == 0);
        if !offsets_ok {
            report.push(Finding::CheckoutOffsets {
                entity: name.to_owned(),
                active: fi.checkout_active,
                inactive: fi.checkout_inactive,
            });
        }
    }
    log.verify(name, dh, report);

    Decoded {
        kind: NodeKind::File,
        parent: None,
        path,
        children: Vec::new(),
    }
}

fn check_chunk_crc(entity: &str, chunk: &Chunk, report: &mut Report) {
    if let Some((stored, computed)) = chunk.crc_mismatch() {
        report.push(Finding::ChunkCrcMismatch {
            entity: entity.to_owned(),
            marker: marker::display(chunk.marker),
            offset: chunk.offset,
            stored,
            computed,
        });
    }
}

fn check_log_entry(entity: &str, chunk: &Chunk, entry: &LogEntry, report: &mut Report) {
    if entry.opcode().is_none() {
        report.push(Finding::UnknownOpcode {
            entity: entity.to_owned(),
            opcode: entry.raw_opcode,
            offset: chunk.offset,
        });
    }
    if let Some(item_name) = entry.tail.name() {
        check_name_flags(entity, item_name, report);
    }
    if let LogTail::Renamed { new_name, .. } = &entry.tail {
        check_name_flags(entity, new_name, report);
    }
}

fn check_name_flags(entity: &str, item: &ItemName, report: &mut Report) {
    if !item.flags_expected() {
        report.push(Finding::UnexpectedNameFlags {
            entity: entity.to_owned(),
            flags: item.flags,
            name: item.name.clone(),
        });
    }
}

/// Collects the log entries of one stream for chain verification.
#[derive(Default)]
struct LogCollector {
    /// Chunk offset, back-pointer, version.
    entries: Vec<(u32, u32, u16)>,
}

impl LogCollector {
    fn push(&mut self, chunk: &Chunk, entry: &LogEntry) {
        self.entries
            .push((chunk.offset as u32, entry.previous_offset, entry.version));
    }

    /// Follows the back-pointers from the last entry the data header
    /// names: the chain must stay on real entries, versions must
    /// strictly decrease walking backwards, it must not loop, and it
    /// must end on the first entry the header names.
    fn verify(self, entity: &str, dh: &DataHeader, report: &mut Report) {
        if self.entries.len() != dh.log_entry_count as usize {
            report.push(Finding::CountMismatch {
                entity: entity.to_owned(),
                what: "log entries",
                expected: dh.log_entry_count as u32,
                found: self.entries.len() as u32,
            });
        }
        if self.entries.is_empty() {
            return;
        }

        let by_offset: HashMap<u32, (u32, u16)> = self
            .entries
            .iter()
            .map(|&(offset, previous, version)| (offset, (previous, version)))
            .collect();

        let mut at = dh.last_log_offset;
        let mut newer_version: Option<u16> = None;
        let mut oldest_seen = at;
        let mut steps = 0usize;
        while at != 0 {
            let Some(&(previous, version)) = by_offset.get(&at) else {
                report.push(Finding::LogChain {
                    entity: entity.to_owned(),
                    detail: format!("back-pointer {at:#x} does not land on a log entry"),
                });
                return;
            };
            if let Some(newer) = newer_version {
                if version >= newer {
                    report.push(Finding::LogChain {
                        entity: entity.to_owned(),
                        detail: format!(
                            "version {version} at {at:#x} not below its successor {newer}"
                        ),
                    });
                    return;
                }
            }
            newer_version = Some(version);
            steps += 1;
            if steps > self.entries.len() {
                report.push(Finding::LogChain {
                    entity: entity.to_owned(),
                    detail: "back-pointers form a loop".into(),
                });
                return;
            }
            oldest_seen = at;
            at = previous;
        }

        if steps != self.entries.len() {
            report.push(Finding::LogChain {
                entity: entity.to_owned(),
                detail: format!("chain covers {steps} of {} entries", self.entries.len()),
            });
        } else if oldest_seen != dh.first_log_offset {
            report.push(Finding::LogChain {
                entity: entity.to_owned(),
                detail: format!(
                    "chain ends at {oldest_seen:#x}, header names {:#x}",
                    dh.first_log_offset
                ),
            });
        }
    }
}
