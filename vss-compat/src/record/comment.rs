//! The `MC` comment chunk.
//!
//! Comments come from check-ins and labels alike (a label's comment is
//! stored separately from the label itself), and some operations write
//! one even for an empty comment. The chunk size is authoritative; the
//! text inside is NUL-terminated.

use bstr::BString;

/// Extracts the comment text from an `MC` payload, dropping trailing
/// NULs. Comments are not guaranteed to be valid UTF-8.
pub fn read_comment(payload: &[u8]) -> BString {
    let end = payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    BString::from(&payload[..end])
}
