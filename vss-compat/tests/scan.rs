//! End-to-end scans over synthetic databases written to disk.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vss_compat::base26;
use vss_compat::chunk::{marker, ChunkReader};
use vss_compat::crc;
use vss_compat::cursor::Cursor;
use vss_compat::record::{self, LogTail, Opcode, CHILD_FLAG_SHARED};
use vss_compat::tree::{Finding, NodeKind, Report, Tree};

const PROJECT: u16 = 1;
const FILE: u16 = 2;

/// First chunk after the fixed header, the DH chunk and the 276-byte
/// kind prefix.
const FIRST_CHUNK: u32 = 0x1A0;

fn fixed(s: &str, width: usize) -> Vec<u8> {
    let mut out = s.as_bytes().to_vec();
    out.resize(width, 0);
    out
}

fn chunk(marker: u16, payload: &[u8]) -> Vec<u8> {
    chunk_with_crc(marker, crc::crc16(payload), payload)
}

fn chunk_with_crc(marker: u16, stored_crc: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&marker.to_le_bytes());
    out.extend_from_slice(&stored_crc.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn info_header(kind: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(record::MAGIC);
    out.extend_from_slice(&[0u8; 12]);
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&record::SUPPORTED_VERSION.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out
}

fn dh(kind: u16, log_entries: u16, has_parent: u16, name: &str, first: u32, last: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&log_entries.to_le_bytes());
    out.extend_from_slice(&has_parent.to_le_bytes());
    out.extend(fixed(name, 34));
    out.extend_from_slice(&0u32.to_le_bytes()); // short name offset
    out.extend_from_slice(&1u16.to_le_bytes()); // branch number
    out.extend_from_slice(b".a");
    out.extend_from_slice(&first.to_le_bytes());
    out.extend_from_slice(&last.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // file size, not validated
    out.extend_from_slice(&0u16.to_le_bytes()); // counter
    out.extend_from_slice(&[0u8; 18]);
    assert_eq!(out.len(), 80);
    out
}

fn project_prefix(parent_path: &str, parent_name: &str, children: u16, projects: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(fixed(parent_path, 260));
    out.extend(fixed(parent_name, 12));
    out.extend_from_slice(&children.to_le_bytes());
    out.extend_from_slice(&projects.to_le_bytes());
    assert_eq!(out.len(), 276);
    out
}

fn file_prefix(data_crc: u32, branch_count: u16, parent_count: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&[0u8; 10]); // shared from
    out.extend_from_slice(&0u32.to_le_bytes()); // last branch offset
    out.extend_from_slice(&0u32.to_le_bytes()); // last parent offset
    out.extend_from_slice(&branch_count.to_le_bytes());
    out.extend_from_slice(&parent_count.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // checkout active
    out.extend_from_slice(&FIRST_CHUNK.to_le_bytes()); // checkout inactive
    out.extend_from_slice(&data_crc.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&0x3804_0000u32.to_le_bytes()); // checkin time
    out.extend_from_slice(&0x3804_0001u32.to_le_bytes()); // modified time
    out.extend_from_slice(&0x3804_0002u32.to_le_bytes()); // creation time
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&[0u8; 200]);
    out.extend_from_slice(&0u16.to_le_bytes()); // item count
    out.extend_from_slice(&0u16.to_le_bytes()); // project count
    assert_eq!(out.len(), 276);
    out
}

fn log_prefix(prev: u32, opcode: u16, version: u16, user: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&prev.to_le_bytes());
    out.extend_from_slice(&opcode.to_le_bytes());
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&0x3804_1000u32.to_le_bytes()); // timestamp
    out.extend(fixed(user, 32));
    out.extend(fixed("", 32)); // label
    out.extend_from_slice(&[0u8; 12]); // comment and label pointers
    out
}

fn name_triple(flags: u16, name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend(fixed(name, 34));
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

fn log_named(prev: u32, opcode: Opcode, version: u16, user: &str, flags: u16, name: &str, db: &[u8; 10]) -> Vec<u8> {
    let mut out = log_prefix(prev, opcode as u16, version, user);
    out.extend(name_triple(flags, name));
    out.extend_from_slice(db);
    out
}

fn log_renamed(prev: u32, version: u16, user: &str, old: &str, new: &str, db: &[u8; 10]) -> Vec<u8> {
    let mut out = log_prefix(prev, Opcode::RenamedFile as u16, version, user);
    out.extend(name_triple(0, old));
    out.extend(name_triple(0, new));
    out.extend_from_slice(db);
    out
}

fn log_branched(prev: u32, version: u16, user: &str, name: &str, db: &[u8; 10], source: &[u8; 10]) -> Vec<u8> {
    let mut out = log_prefix(prev, Opcode::BranchedFile as u16, version, user);
    out.extend(name_triple(0, name));
    out.extend_from_slice(db);
    out.extend_from_slice(source);
    out
}

fn log_checkin(prev: u32, version: u16, user: &str, diff: u32, path: &str) -> Vec<u8> {
    let mut out = log_prefix(prev, Opcode::CheckedInFile as u16, version, user);
    out.extend_from_slice(&diff.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend(fixed(path, 260));
    out
}

fn child_payload(item_type: u16, flags: u16, name_flags: u16, name: &str, db: &[u8; 10]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&item_type.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend(name_triple(name_flags, name));
    out.extend_from_slice(&0u16.to_le_bytes()); // reserved
    out.extend_from_slice(db);
    out
}

fn parent_payload(prev: u32, db: &[u8; 10]) -> Vec<u8> {
    let mut out = prev.to_le_bytes().to_vec();
    out.extend_from_slice(db);
    out
}

fn branch_payload(prev: u32, db: &[u8; 10]) -> Vec<u8> {
    parent_payload(prev, db)
}

fn checkout_zeroed() -> Vec<u8> {
    vec![0u8; 666]
}

/// A root project whose data stream holds the given framed child
/// chunks.
fn root_project(children: u16, projects: u16) -> Vec<u8> {
    let el = log_named(0, Opcode::CreatedProject, 1, "admin", 1, "$", b"aaaaaaaa\0\0");
    let mut info = info_header(PROJECT);
    info.extend(chunk(
        marker::DATA_HEADER,
        &dh(PROJECT, 1, 0, "$", FIRST_CHUNK, FIRST_CHUNK),
    ));
    info.extend(project_prefix("", "", children, projects));
    info.extend(chunk(marker::LOG_ENTRY, &el));
    info
}

fn write_db(entities: &[(u32, Vec<u8>, Option<Vec<u8>>)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (id, info, data) in entities {
        let name = base26::encode(*id as u64);
        let dir = tmp.path().join("data").join(&name[..1]);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(&name), info).unwrap();
        if let Some(data) = data {
            fs::write(dir.join(format!("{name}.a")), data).unwrap();
        }
    }
    tmp
}

fn scan(root: &Path) -> (Tree, Report) {
    let mut tree = Tree::import(root).unwrap();
    let mut report = Report::default();
    tree.assemble(&mut report).unwrap();
    tree.audit(&mut report);
    (tree, report)
}

/// Decodes an info stream's data header and log entries, the way a
/// history browser would.
fn read_log(info: &[u8]) -> (record::DataHeader, Vec<(u32, record::LogEntry)>) {
    let mut cursor = Cursor::new(info);
    record::scan_item_header(&mut cursor).unwrap();

    let mut chunks = ChunkReader::new(info, cursor.offset());
    let dh_chunk = chunks.next().unwrap().unwrap();
    assert_eq!(dh_chunk.marker, marker::DATA_HEADER);
    let dh = record::read_data_header(&mut dh_chunk.cursor());

    let mut chunks = ChunkReader::new(info, chunks.offset() + 276);
    let mut entries = Vec::new();
    while let Some(chunk) = chunks.next().unwrap() {
        if chunk.marker == marker::LOG_ENTRY {
            entries.push((
                chunk.offset as u32,
                record::read_log_entry(&mut chunk.cursor()),
            ));
        }
    }
    (dh, entries)
}

/// Walks the change log backwards from the last entry.
fn opcodes_backwards(dh: &record::DataHeader, entries: &[(u32, record::LogEntry)]) -> Vec<Opcode> {
    let mut opcodes = Vec::new();
    let mut at = dh.last_log_offset;
    while at != 0 {
        let (_, entry) = entries.iter().find(|(offset, _)| *offset == at).unwrap();
        opcodes.push(entry.opcode().unwrap());
        at = entry.previous_offset;
    }
    opcodes
}

/// A single checked-in file entity: checkout chunk, one parent link to
/// the root, a creation entry and one check-in. Returns the info
/// stream.
fn checked_in_file(name: &str, self_db: &[u8; 10], data: &[u8]) -> Vec<u8> {
    let cf = checkout_zeroed();
    let pf_off = FIRST_CHUNK + 8 + cf.len() as u32;
    let pf = parent_payload(0, b"aaaaaaaa\0\0");
    let el1_off = pf_off + 8 + pf.len() as u32;
    let el1 = log_named(0, Opcode::CreatedFile, 1, "alice", 0, name, self_db);
    let el2_off = el1_off + 8 + el1.len() as u32;
    let el2 = log_checkin(el1_off, 2, "alice", 0, "$/hello.txt");

    let mut info = info_header(FILE);
    info.extend(chunk(
        marker::DATA_HEADER,
        &dh(FILE, 2, 0, name, el1_off, el2_off),
    ));
    info.extend(file_prefix(crc::crc32(data), 0, 1));
    info.extend(chunk(marker::CHECKOUT, &cf));
    info.extend(chunk(marker::PARENT_FOLDER, &pf));
    info.extend(chunk(marker::LOG_ENTRY, &el1));
    info.extend(chunk(marker::LOG_ENTRY, &el2));
    info
}

#[test]
fn empty_database() {
    let db = write_db(&[(0, root_project(0, 0), Some(Vec::new()))]);
    let (tree, report) = scan(db.path());

    assert!(report.is_clean(), "{:?}", report.findings);
    assert_eq!(report.info_files, 1);
    assert_eq!(report.data_files, 1);
    assert_eq!(report.visited, 1);
    assert_eq!(report.unallocated, 0);
    assert!(report.orphans.is_empty());

    let root = tree.node(0).unwrap();
    assert_eq!(root.kind, NodeKind::Project);
    assert_eq!(root.parent, None);
}

#[test]
fn single_checked_in_file() {
    let data = b"hello world\n".to_vec();
    let info = checked_in_file("hello.txt", b"baaaaaaa\0\0", &data);

    let root_data = chunk(
        marker::CHILD,
        &child_payload(FILE, 0, 0, "hello.txt", b"baaaaaaa\0\0"),
    );

    let db = write_db(&[
        (0, root_project(1, 0), Some(root_data)),
        (1, info, Some(data)),
    ]);
    let (tree, report) = scan(db.path());

    assert!(report.is_clean(), "{:?}", report.findings);
    assert_eq!(report.visited, 2);
    assert_eq!(tree.node(1).unwrap().kind, NodeKind::File);

    let info = tree.node(1).unwrap().info.as_deref().unwrap();
    let (dh, entries) = read_log(info);
    assert_eq!(dh.branch_number, 1);
    assert_eq!(
        opcodes_backwards(&dh, &entries),
        vec![Opcode::CheckedInFile, Opcode::CreatedFile]
    );
}

#[test]
fn renamed_file_exposes_both_names() {
    let data = b"int main() { return 0; }\n".to_vec();

    let cf = checkout_zeroed();
    let pf_off = FIRST_CHUNK + 8 + cf.len() as u32;
    let pf = parent_payload(0, b"aaaaaaaa\0\0");
    let el1_off = pf_off + 8 + pf.len() as u32;
    let el1 = log_named(0, Opcode::CreatedFile, 1, "bob", 0, "old.c", b"baaaaaaa\0\0");
    let el2_off = el1_off + 8 + el1.len() as u32;
    let el2 = log_renamed(el1_off, 2, "bob", "old.c", "new.c", b"baaaaaaa\0\0");

    let mut info = info_header(FILE);
    info.extend(chunk(
        marker::DATA_HEADER,
        &dh(FILE, 2, 0, "new.c", el1_off, el2_off),
    ));
    info.extend(file_prefix(crc::crc32(&data), 0, 1));
    info.extend(chunk(marker::CHECKOUT, &cf));
    info.extend(chunk(marker::PARENT_FOLDER, &pf));
    info.extend(chunk(marker::LOG_ENTRY, &el1));
    info.extend(chunk(marker::LOG_ENTRY, &el2));

    let root_data = chunk(
        marker::CHILD,
        &child_payload(FILE, 0, 0, "new.c", b"baaaaaaa\0\0"),
    );

    let db = write_db(&[
        (0, root_project(1, 0), Some(root_data)),
        (1, info, Some(data)),
    ]);
    let (tree, report) = scan(db.path());
    assert!(report.is_clean(), "{:?}", report.findings);

    let info = tree.node(1).unwrap().info.as_deref().unwrap();
    let (dh, entries) = read_log(info);
    let renamed = entries
        .iter()
        .find(|(_, e)| e.opcode() == Some(Opcode::RenamedFile))
        .map(|(_, e)| &e.tail)
        .unwrap();
    match renamed {
        LogTail::Renamed { name, new_name, .. } => {
            assert_eq!(name.name, "old.c");
            assert_eq!(new_name.name, dh.name);
        }
        tail => panic!("wrong tail: {tail:?}"),
    }
}

#[test]
fn shared_file_is_visited_once() {
    let data = b"shared content\n".to_vec();

    // Entity 2 hangs off both the root and the sub-project, with a
    // parent link for each.
    let cf = checkout_zeroed();
    let pf1_off = FIRST_CHUNK + 8 + cf.len() as u32;
    let pf1 = parent_payload(0, b"aaaaaaaa\0\0");
    let pf2_off = pf1_off + 8 + pf1.len() as u32;
    let pf2 = parent_payload(pf1_off, b"baaaaaaa\0\0");
    let el_off = pf2_off + 8 + pf2.len() as u32;
    let el = log_named(0, Opcode::CreatedFile, 1, "carol", 0, "shared.c", b"caaaaaaa\0\0");

    let mut file_info = info_header(FILE);
    file_info.extend(chunk(
        marker::DATA_HEADER,
        &dh(FILE, 1, 0, "shared.c", el_off, el_off),
    ));
    file_info.extend(file_prefix(crc::crc32(&data), 0, 2));
    file_info.extend(chunk(marker::CHECKOUT, &cf));
    file_info.extend(chunk(marker::PARENT_FOLDER, &pf1));
    file_info.extend(chunk(marker::PARENT_FOLDER, &pf2));
    file_info.extend(chunk(marker::LOG_ENTRY, &el));

    // The sub-project, child of the root.
    let sub_el = log_named(0, Opcode::CreatedProject, 1, "carol", 1, "sub", b"baaaaaaa\0\0");
    let mut sub_info = info_header(PROJECT);
    sub_info.extend(chunk(
        marker::DATA_HEADER,
        &dh(PROJECT, 1, 1, "sub", FIRST_CHUNK, FIRST_CHUNK),
    ));
    sub_info.extend(project_prefix("$", "aaaaaaaa", 1, 0));
    sub_info.extend(chunk(marker::LOG_ENTRY, &sub_el));
    let sub_data = chunk(
        marker::CHILD,
        &child_payload(FILE, CHILD_FLAG_SHARED, 0, "shared.c", b"caaaaaaa\0\0"),
    );

    let mut root_data = chunk(
        marker::CHILD,
        &child_payload(PROJECT, 0, 1, "sub", b"baaaaaaa\0\0"),
    );
    root_data.extend(chunk(
        marker::CHILD,
        &child_payload(FILE, CHILD_FLAG_SHARED, 0, "shared.c", b"caaaaaaa\0\0"),
    ));

    let db = write_db(&[
        (0, root_project(2, 1), Some(root_data)),
        (1, sub_info, Some(sub_data)),
        (2, file_info, Some(data)),
    ]);
    let (tree, report) = scan(db.path());

    assert!(report.is_clean(), "{:?}", report.findings);
    assert_eq!(report.visited, 3);
    assert_eq!(tree.node(1).unwrap().kind, NodeKind::Project);
    assert_eq!(tree.node(1).unwrap().parent, Some(0));
    assert_eq!(tree.node(2).unwrap().kind, NodeKind::File);
}

#[test]
fn branched_file_references_its_source() {
    let orig_data = b"original\n".to_vec();
    let fork_data = b"original\n".to_vec();

    // The source: one valid parent link, one zeroed out by the branch,
    // and a branch record naming the fork.
    let cf = checkout_zeroed();
    let pf1_off = FIRST_CHUNK + 8 + cf.len() as u32;
    let pf1 = parent_payload(0, b"aaaaaaaa\0\0");
    let pf2_off = pf1_off + 8 + pf1.len() as u32;
    let pf2 = parent_payload(pf1_off, &[0u8; 10]);
    let bf_off = pf2_off + 8 + pf2.len() as u32;
    let bf = branch_payload(0, b"caaaaaaa\0\0");
    let el_off = bf_off + 8 + bf.len() as u32;
    let el = log_named(0, Opcode::CreatedFile, 1, "dave", 0, "orig.c", b"baaaaaaa\0\0");

    let mut orig_info = info_header(FILE);
    orig_info.extend(chunk(
        marker::DATA_HEADER,
        &dh(FILE, 1, 0, "orig.c", el_off, el_off),
    ));
    orig_info.extend(file_prefix(crc::crc32(&orig_data), 1, 1));
    orig_info.extend(chunk(marker::CHECKOUT, &cf));
    orig_info.extend(chunk(marker::PARENT_FOLDER, &pf1));
    orig_info.extend(chunk(marker::PARENT_FOLDER, &pf2));
    orig_info.extend(chunk(marker::BRANCH, &bf));
    orig_info.extend(chunk(marker::LOG_ENTRY, &el));

    // The fork starts its log with the branch entry.
    let cf2 = checkout_zeroed();
    let pf_off = FIRST_CHUNK + 8 + cf2.len() as u32;
    let pf = parent_payload(0, b"aaaaaaaa\0\0");
    let fel_off = pf_off + 8 + pf.len() as u32;
    let fel = log_branched(0, 1, "dave", "fork.c", b"caaaaaaa\0\0", b"baaaaaaa\0\0");

    let mut fork_info = info_header(FILE);
    fork_info.extend(chunk(
        marker::DATA_HEADER,
        &dh(FILE, 1, 0, "fork.c", fel_off, fel_off),
    ));
    fork_info.extend(file_prefix(crc::crc32(&fork_data), 0, 1));
    fork_info.extend(chunk(marker::CHECKOUT, &cf2));
    fork_info.extend(chunk(marker::PARENT_FOLDER, &pf));
    fork_info.extend(chunk(marker::LOG_ENTRY, &fel));

    let mut root_data = chunk(
        marker::CHILD,
        &child_payload(FILE, 0, 0, "orig.c", b"baaaaaaa\0\0"),
    );
    root_data.extend(chunk(
        marker::CHILD,
        &child_payload(FILE, 0, 0, "fork.c", b"caaaaaaa\0\0"),
    ));

    let db = write_db(&[
        (0, root_project(2, 0), Some(root_data)),
        (1, orig_info, Some(orig_data)),
        (2, fork_info, Some(fork_data)),
    ]);
    let (tree, report) = scan(db.path());

    assert!(report.is_clean(), "{:?}", report.findings);
    assert_eq!(report.visited, 3);

    let info = tree.node(2).unwrap().info.as_deref().unwrap();
    let (_, entries) = read_log(info);
    match &entries[0].1.tail {
        LogTail::Branched { source, .. } => assert_eq!(source.decode(), Ok(1)),
        tail => panic!("wrong tail: {tail:?}"),
    }
}

#[test]
fn corrupted_crc_is_a_single_finding() {
    let data = b"hello world\n".to_vec();

    let cf = checkout_zeroed();
    let pf_off = FIRST_CHUNK + 8 + cf.len() as u32;
    let pf = parent_payload(0, b"aaaaaaaa\0\0");
    let el1_off = pf_off + 8 + pf.len() as u32;
    let el1 = log_named(0, Opcode::CreatedFile, 1, "alice", 0, "hello.txt", b"baaaaaaa\0\0");
    let el2_off = el1_off + 8 + el1.len() as u32;
    let el2 = log_checkin(el1_off, 2, "alice", 0, "$/hello.txt");

    // Stored CRC off by one on the parent chunk.
    let good = crc::crc16(&pf);
    let bad = good.wrapping_add(1).max(1);

    let mut info = info_header(FILE);
    info.extend(chunk(
        marker::DATA_HEADER,
        &dh(FILE, 2, 0, "hello.txt", el1_off, el2_off),
    ));
    info.extend(file_prefix(crc::crc32(&data), 0, 1));
    info.extend(chunk(marker::CHECKOUT, &cf));
    info.extend(chunk_with_crc(marker::PARENT_FOLDER, bad, &pf));
    info.extend(chunk(marker::LOG_ENTRY, &el1));
    info.extend(chunk(marker::LOG_ENTRY, &el2));

    let root_data = chunk(
        marker::CHILD,
        &child_payload(FILE, 0, 0, "hello.txt", b"baaaaaaa\0\0"),
    );

    let db = write_db(&[
        (0, root_project(1, 0), Some(root_data)),
        (1, info, Some(data)),
    ]);
    let (tree, report) = scan(db.path());

    // One recoverable finding; the rest of the scan is unchanged.
    assert_eq!(report.findings.len(), 1, "{:?}", report.findings);
    assert!(matches!(
        &report.findings[0],
        Finding::ChunkCrcMismatch { marker, .. } if marker == "PF"
    ));
    assert_eq!(report.visited, 2);
    assert_eq!(tree.node(1).unwrap().kind, NodeKind::File);
}

#[test]
fn orphans_are_reported_not_fatal() {
    // Entity 5 exists on disk but nothing references it; ids 1-4 were
    // never allocated. The orphan's contents are never parsed, so any
    // bytes will do.
    let db = write_db(&[
        (0, root_project(0, 0), Some(Vec::new())),
        (5, b"leftover bytes".to_vec(), Some(b"x".to_vec())),
    ]);
    let (_, report) = scan(db.path());

    assert!(report.is_clean(), "{:?}", report.findings);
    assert_eq!(report.visited, 1);
    assert_eq!(report.unallocated, 4);
    assert_eq!(report.orphans, vec![(5, "faaaaaaa".to_string())]);
}

#[test]
fn missing_root_is_fatal() {
    let db = write_db(&[(3, root_project(0, 0), Some(Vec::new()))]);
    let mut tree = Tree::import(db.path()).unwrap();
    let mut report = Report::default();
    assert!(tree.assemble(&mut report).is_err());
}

#[test]
fn duplicate_data_file_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("data").join("a");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("aaaaaaaa"), root_project(0, 0)).unwrap();
    fs::write(dir.join("aaaaaaaa.a"), b"one").unwrap();
    fs::write(dir.join("aaaaaaaa.b"), b"two").unwrap();

    assert!(Tree::import(tmp.path()).is_err());
}

#[test]
fn stray_files_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("data").join("a");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("aaaaaaaa"), root_project(0, 0)).unwrap();
    fs::write(dir.join("aaaaaaaa.a"), Vec::<u8>::new()).unwrap();
    fs::write(tmp.path().join("data").join("names.dat"), b"names").unwrap();
    fs::write(tmp.path().join("data").join("version.dat"), b"\x06\0").unwrap();
    fs::write(dir.join("readme.txt"), b"not an entity").unwrap();

    let (tree, report) = scan(tmp.path());
    assert_eq!(report.info_files, 1);
    assert_eq!(report.data_files, 1);
    assert_eq!(tree.len(), 1);
}
