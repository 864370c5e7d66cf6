//! Loading a database directory into the entity table.
//!
//! Entities live under `data/{a..z}/`, named by their id in the
//! 8-letter encoding: `dcaaaaaa` is the info file of entity 55,
//! `dcaaaaaa.a` (or `.b`, the writer alternates) its data file.
//! Everything else in those directories is ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::Tree;
use crate::base26;

/// Hard ceiling on the entity table. Real databases stay in the low
/// thousands; a name decoding to something enormous is a stray file,
/// not an entity.
pub(crate) const MAX_ENTITIES: u64 = 1 << 24;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("duplicate {stream} file for entity {id} ({name}) at {}", .path.display())]
    DuplicateEntity {
        id: u32,
        name: String,
        stream: &'static str,
        path: PathBuf,
    },

    #[error("entity id {id} from {} exceeds the supported table size", .path.display())]
    IdOutOfRange { id: u64, path: PathBuf },
}

/// An info file is exactly 8 letters.
fn is_info_name(name: &str) -> bool {
    name.len() == 8 && name.bytes().all(|b| b.is_ascii_alphabetic())
}

/// A data file is 8 letters, a dot, and one letter. Only `a` and `b`
/// extensions have been observed, but any letter is accepted.
fn is_data_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 10
        && bytes[..8].iter().all(|b| b.is_ascii_alphabetic())
        && bytes[8] == b'.'
        && bytes[9].is_ascii_alphabetic()
}

impl Tree {
    /// Loads every entity file under `root/data/{a..z}` into a fresh
    /// table.
    pub fn import(root: &Path) -> Result<Tree, ImportError> {
        let mut tree = Tree::default();
        let data_dir = root.join("data");

        for letter in b'a'..=b'z' {
            tree.import_dir(&data_dir.join((letter as char).to_string()))?;
        }

        info!(
            info_files = tree.info_count,
            data_files = tree.data_count,
            bytes = tree.byte_size,
            entities = tree.nodes.len(),
            "import complete"
        );
        Ok(tree)
    }

    fn import_dir(&mut self, dir: &Path) -> Result<(), ImportError> {
        // Small databases do not use every letter bucket.
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(ImportError::Io {
                    path: dir.to_owned(),
                    source,
                })
            }
        };

        for entry in entries {
            let entry = entry.map_err(|source| ImportError::Io {
                path: dir.to_owned(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let is_info = if is_info_name(name) {
                true
            } else if is_data_name(name) {
                false
            } else {
                continue;
            };

            // Well-formed names always decode.
            let id = base26::decode(name[..8].as_bytes()).expect("classified name must decode");
            self.import_file(&path, id, is_info)?;
        }
        Ok(())
    }

    fn import_file(&mut self, path: &Path, id: u64, is_info: bool) -> Result<(), ImportError> {
        if id >= MAX_ENTITIES {
            return Err(ImportError::IdOutOfRange {
                id,
                path: path.to_owned(),
            });
        }
        let id = id as u32;

        let bytes = fs::read(path).map_err(|source| ImportError::Io {
            path: path.to_owned(),
            source,
        })?;
        debug!(id, path = %path.display(), len = bytes.len(), "loaded entity file");

        self.byte_size += bytes.len() as u64;
        let node = self.slot(id);
        let stream = if is_info {
            &mut node.info
        } else {
            &mut node.data
        };
        if stream.is_some() {
            return Err(ImportError::DuplicateEntity {
                id,
                name: base26::encode(id as u64),
                stream: if is_info { "info" } else { "data" },
                path: path.to_owned(),
            });
        }
        *stream = Some(bytes);

        if is_info {
            self.info_count += 1;
        } else {
            self.data_count += 1;
        }
        Ok(())
    }
}
