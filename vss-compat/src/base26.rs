//! The base-26 identifier encoding used for physical file names.
//!
//! Every entity in a SourceSafe database is stored under an 8-letter
//! name like `baaaaaaa`, which encodes the entity's numeric id in
//! little-endian base-26: the least-significant digit comes first, so
//! id 1 is `baaaaaaa`, not `aaaaaaab`. The same encoding appears inside
//! records as 10-byte NUL-padded "db-name" fields. Decoding is
//! case-insensitive since the on-disk corpus mixes cases in different
//! contexts.

use thiserror::Error;

/// Length of an encoded name.
pub const NAME_LEN: usize = 8;

/// Errors that can occur while decoding an 8-letter entity name.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum NameDecodeError {
    /// The name is stored as an empty string. This is the on-disk
    /// convention for "no reference" (the root project's parent, a
    /// destroyed file's child link), not a corrupt field.
    #[error("empty name")]
    Empty,
    #[error("expected {NAME_LEN} characters, got {0}")]
    InvalidLength(usize),
    #[error("character {0:#04x} not in a-z")]
    InvalidCharacter(u8),
}

/// Encodes an entity id as its 8-letter physical name.
///
/// Ids at or above `26^8` have no on-disk representation; the upper
/// digits simply wrap. They cannot occur in practice since the loader
/// derives every id from a well-formed name.
pub fn encode(id: u64) -> String {
    let mut id = id;
    let mut out = String::with_capacity(NAME_LEN);
    for _ in 0..NAME_LEN {
        out.push((b'a' + (id % 26) as u8) as char);
        id /= 26;
    }
    out
}

/// Decodes an 8-letter name back to the entity id.
pub fn decode(name: &[u8]) -> Result<u64, NameDecodeError> {
    if name.is_empty() {
        return Err(NameDecodeError::Empty);
    }
    if name.len() != NAME_LEN {
        return Err(NameDecodeError::InvalidLength(name.len()));
    }

    let mut id = 0u64;
    for &c in name.iter().rev() {
        let digit = match c {
            b'a'..=b'z' => c - b'a',
            b'A'..=b'Z' => c - b'A',
            _ => return Err(NameDecodeError::InvalidCharacter(c)),
        };
        id = id * 26 + digit as u64;
    }
    Ok(id)
}
