//! The entity table and the operations over it.
//!
//! A scan proceeds in three steps: [Tree::import] loads every physical
//! file under `data/` into the table, [Tree::assemble] walks the
//! project graph from the root and decodes each reachable entity, and
//! [Tree::audit] sweeps the table for what the walk never touched.
//! Recoverable anomalies from all three steps accumulate in a
//! [Report]; only structural failures (bad magic, missing root,
//! duplicate files) abort a scan.

mod assemble;
mod import;
mod report;

pub use assemble::AssembleError;
pub use import::ImportError;
pub use report::{Finding, Report};

/// What an entity turned out to be once visited. `Unknown` means the
/// walk never reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Unknown,
    Project,
    File,
}

/// One slot in the entity table.
#[derive(Debug, Default)]
pub struct Node {
    /// The metadata stream, absent for unallocated identifiers.
    pub info: Option<Vec<u8>>,
    /// The content stream: file bytes, or a project's child links.
    pub data: Option<Vec<u8>>,
    pub kind: NodeKind,
    /// Id of the containing project. Set for every project except the
    /// root; files track their parents through `PF` chunks instead.
    pub parent: Option<u32>,
}

impl Node {
    pub fn is_visited(&self) -> bool {
        self.kind != NodeKind::Unknown
    }
}

/// The whole database, resident in memory. Both byte buffers of every
/// entity are owned here; decoding borrows them per visit.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    info_count: u32,
    data_count: u32,
    byte_size: u64,
}

impl Tree {
    pub fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Number of slots in the table, one past the highest id seen.
    pub fn len(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The slot for `id`, growing the table as needed.
    fn slot(&mut self, id: u32) -> &mut Node {
        let index = id as usize;
        if index >= self.nodes.len() {
            self.nodes.resize_with(index + 1, Node::default);
        }
        &mut self.nodes[index]
    }

    /// Sweeps the table for identifiers the walk never reached and
    /// fills in the summary counters.
    pub fn audit(&self, report: &mut Report) {
        report.info_files = self.info_count;
        report.data_files = self.data_count;
        report.byte_size = self.byte_size;
        for (id, node) in self.nodes.iter().enumerate() {
            if node.info.is_none() {
                report.unallocated += 1;
            } else if !node.is_visited() {
                report
                    .orphans
                    .push((id as u32, crate::base26::encode(id as u64)));
            }
        }
    }
}
