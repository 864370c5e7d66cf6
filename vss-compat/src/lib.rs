//! Reader for the on-disk format of Microsoft Visual SourceSafe 6 databases.
//!
//! A SourceSafe database stores every file and folder ("project") as an
//! *entity*: a pair of physical files named by the entity's numeric id
//! in an 8-letter base-26 encoding. The info file (`aaaaaaaa`) carries
//! metadata and the change log; the data file (`aaaaaaaa.a` / `.b`)
//! carries the current content of a file, or the child links of a
//! project. Records inside both streams are framed as RIFF-style chunks
//! with two-letter markers and a 16-bit CRC.
//!
//! The format was never documented and its writer was buggy: padding is
//! frequently uninitialized, CRCs are sometimes left at zero, and
//! reserved fields carry inconsistent values. The decoders here verify
//! and report such anomalies instead of rejecting them.

pub mod base26;
pub mod chunk;
pub mod crc;
pub mod cursor;
pub mod record;
pub mod tree;
