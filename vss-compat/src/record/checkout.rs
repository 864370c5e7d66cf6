//! The `CF` checkout chunk.
//!
//! Every file's info stream carries exactly one, always at offset
//! 0x01A0. A file that was never checked out has it zero-filled. The
//! trailing flag words are only partially understood: `flag1` usually
//! repeats the chunk's own offset and `flag2` is usually 0x1000, but
//! both have been seen as zero.

use crate::cursor::Cursor;
use crate::record::read_string;

/// Offset of the checkout chunk in every file info stream.
pub const CHECKOUT_OFFSET: u32 = 0x01A0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub username: String,
    pub checkout_time: u32,
    /// Path of the working copy on the machine holding the checkout.
    pub filename: String,
    pub machine: String,
    /// Path of the file inside the database, starting with `$/`.
    pub project: String,
    pub comment: String,
    /// Version number while checked out, zero otherwise.
    pub checkout_version: u16,
    /// 0x40 while checked out, 0 otherwise. No other value observed.
    pub checkout_flag: u16,
    /// Always zero in observed databases, even multi-user ones.
    pub next_checkout: u32,
    pub flag1: u16,
    pub flag2: u16,
    pub checkin_version: u16,
}

impl Checkout {
    /// Whether the checkout flag holds one of the two observed values.
    pub fn flag_expected(&self) -> bool {
        matches!(self.checkout_flag, 0 | 0x40)
    }
}

pub fn read_checkout(cursor: &mut Cursor) -> Checkout {
    let username = read_string::<32>(cursor);
    let checkout_time = cursor.read_u32();
    let filename = read_string::<260>(cursor);
    let machine = read_string::<32>(cursor);
    let project = read_string::<260>(cursor);
    let comment = read_string::<64>(cursor);
    let checkout_version = cursor.read_u16();
    let checkout_flag = cursor.read_u16();
    let next_checkout = cursor.read_u32();
    let flag1 = cursor.read_u16();
    let flag2 = cursor.read_u16();
    let checkin_version = cursor.read_u16();

    Checkout {
        username,
        checkout_time,
        filename,
        machine,
        project,
        comment,
        checkout_version,
        checkout_flag,
        next_checkout,
        flag1,
        flag2,
        checkin_version,
    }
}
