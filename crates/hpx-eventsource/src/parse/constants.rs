//! Byte-level constants shared by the frame parser and the accumulator.

use bytes_utils::Str;

/// Line feed.
pub(crate) const LF: u8 = b'\n';
/// Carriage return.
pub(crate) const CR: u8 = b'\r';
/// Field separator.
pub(crate) const COLON: u8 = b':';

const BOM_CHAR: char = '\u{FEFF}';
const BOM_LEN: usize = BOM_CHAR.len_utf8();
/// UTF-8 encoding of U+FEFF, skipped once at the start of a stream.
pub(crate) const BOM: &[u8; BOM_LEN] = &{
    let mut buf = [0u8; BOM_LEN];
    BOM_CHAR.encode_utf8(&mut buf);
    buf
};

pub(crate) const EMPTY_STR: Str = Str::from_static("");
/// Event type used when no `event:` field was seen.
pub(crate) const MESSAGE_STR: Str = Str::from_static("message");
