//! The `FD` difference chunk: reverse deltas between file versions.
//!
//! A difference script transforms the *newer* version of a file into
//! the older one. Checking in version N rewrites the data file with the
//! new content and stores a script that reconstructs version N-1, so
//! recovering an old version means starting from the current data
//! stream and applying scripts one by one while walking the change log
//! backwards.
//!
//! ```plain
//! record ::= opcode:u16 reserved:u16 offset:u32 count:u32 data[count if insert]
//! ```
//!
//! Opcode 0 inserts `count` bytes carried in the script, opcode 1
//! copies `count` bytes from `offset` of the newer version, opcode 2
//! halts. The offset/count pair is present even where unused.

use crate::cursor::Cursor;

const OP_INSERT: u16 = 0;
const OP_COPY: u16 = 1;
const OP_HALT: u16 = 2;

/// A single difference operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    /// Emit bytes carried in the script itself.
    Insert(Vec<u8>),
    /// Emit `count` bytes starting at `offset` of the newer version.
    Copy { offset: u32, count: u32 },
}

/// A decoded difference script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaScript {
    pub ops: Vec<DeltaOp>,
    /// True when the script ended with the halt opcode rather than the
    /// payload running dry or an unknown opcode appearing.
    pub terminated: bool,
}

impl DeltaScript {
    /// Applies the script to the newer version of the file, yielding
    /// the previous version. Copies that reach past the end of `newer`
    /// are clipped.
    pub fn apply(&self, newer: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                DeltaOp::Insert(data) => out.extend_from_slice(data),
                DeltaOp::Copy { offset, count } => {
                    let start = (*offset as usize).min(newer.len());
                    let end = (start + *count as usize).min(newer.len());
                    out.extend_from_slice(&newer[start..end]);
                }
            }
        }
        out
    }
}

pub fn read_delta(cursor: &mut Cursor) -> DeltaScript {
    let mut ops = Vec::new();
    let mut terminated = false;

    // A truncated payload zero-fills into endless empty inserts, so the
    // loop also stops when the payload runs dry.
    while cursor.remaining() > 0 {
        let opcode = cursor.read_u16();
        let _reserved = cursor.read_u16();
        let offset = cursor.read_u32();
        let count = cursor.read_u32();

        match opcode {
            OP_INSERT => {
                let Some(data) = cursor.read_slice(count as usize) else {
                    break;
                };
                ops.push(DeltaOp::Insert(data.to_vec()));
            }
            OP_COPY => ops.push(DeltaOp::Copy { offset, count }),
            OP_HALT => {
                terminated = true;
                break;
            }
            _ => break,
        }
    }

    DeltaScript { ops, terminated }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn op(opcode: u16, offset: u32, count: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&opcode.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out
    }

    #[test]
    fn decodes_a_script() {
        let mut payload = op(OP_INSERT, 0, 4);
        payload.extend_from_slice(b"bye ");
        payload.extend(op(OP_COPY, 6, 5));
        payload.extend(op(OP_HALT, 0, 0));

        let script = read_delta(&mut Cursor::new(&payload));
        assert!(script.terminated);
        assert_eq!(
            script.ops,
            vec![
                DeltaOp::Insert(b"bye ".to_vec()),
                DeltaOp::Copy {
                    offset: 6,
                    count: 5
                },
            ]
        );
    }

    #[test]
    fn applies_a_script_backwards() {
        let mut payload = op(OP_INSERT, 0, 4);
        payload.extend_from_slice(b"bye ");
        payload.extend(op(OP_COPY, 6, 5));
        payload.extend(op(OP_HALT, 0, 0));

        let script = read_delta(&mut Cursor::new(&payload));
        assert_eq!(script.apply(b"hello world"), b"bye world");
    }

    #[test]
    fn truncated_script_stops_cleanly() {
        let mut payload = op(OP_INSERT, 0, 100);
        payload.extend_from_slice(b"short");

        let script = read_delta(&mut Cursor::new(&payload));
        assert!(!script.terminated);
        assert_eq!(script.ops, vec![]);
    }

    #[test]
    fn copies_are_clipped_to_the_source() {
        let script = DeltaScript {
            ops: vec![DeltaOp::Copy {
                offset: 8,
                count: 100,
            }],
            terminated: true,
        };
        assert_eq!(script.apply(b"0123456789"), b"89");
    }
}
