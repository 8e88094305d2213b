//! Incremental line decoder for `text/event-stream`.
//!
//! Turns buffered bytes into [`Frame`]s, one per complete line. A line is
//! terminated by LF, CR or CRLF; a CR at the very end of the buffer is held
//! back until the next byte shows whether it starts a CRLF pair.

use core::str::Utf8Error;

use bytes::{Buf, Bytes, BytesMut};
use bytes_utils::Str;

use super::constants::{COLON, CR, EMPTY_STR, LF};

/// Field names the accumulator acts on. Anything else is consumed and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldName {
    Event,
    Data,
    Id,
    Retry,
    Unknown,
}

impl FieldName {
    fn from_bytes(name: &[u8]) -> Self {
        match name {
            b"event" => Self::Event,
            b"data" => Self::Data,
            b"id" => Self::Id,
            b"retry" => Self::Retry,
            _ => Self::Unknown,
        }
    }
}

/// One decoded line of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Blank line: dispatch boundary.
    Boundary,
    /// Line starting with `:`.
    Comment,
    /// `name: value`, or a bare `name` with an empty value.
    Field { name: FieldName, value: Str },
}

/// Returns `(line_end, next_line_start)` for the first terminator in `bytes`,
/// or `None` if more input is needed.
fn find_eol(bytes: &[u8]) -> Option<(usize, usize)> {
    let pos = memchr::memchr2(CR, LF, bytes)?;

    if bytes[pos] == LF {
        return Some((pos, pos + 1));
    }
    match bytes.get(pos + 1) {
        None => None,
        Some(&LF) => Some((pos, pos + 2)),
        Some(_) => Some((pos, pos + 1)),
    }
}

/// Wraps a slice of an already validated line.
fn validated_str(bytes: Bytes) -> Str {
    // Safety: `bytes` is a slice of a UTF-8 line cut at ASCII boundaries.
    unsafe { Str::from_inner_unchecked(bytes) }
}

fn decode_line(line: Bytes) -> Result<Frame, Utf8Error> {
    if line.is_empty() {
        return Ok(Frame::Boundary);
    }
    core::str::from_utf8(&line)?;

    let (name, value) = match memchr::memchr(COLON, &line) {
        Some(0) => return Ok(Frame::Comment),
        Some(colon) => {
            let value = line.slice(colon + 1..);
            let value = if value.first() == Some(&b' ') {
                value.slice(1..)
            } else {
                value
            };
            (line.slice(..colon), Some(value))
        }
        None => (line.clone(), None),
    };

    let name = FieldName::from_bytes(&name);
    let value = value.map_or(EMPTY_STR, validated_str);
    Ok(Frame::Field { name, value })
}

/// Pops the next complete line off `buffer` and decodes it.
///
/// Returns `None` when the buffer holds no complete line. Invalid UTF-8
/// anywhere in the line, comments included, is reported as an error; the
/// offending line is still consumed.
pub(crate) fn next_frame(buffer: &mut BytesMut) -> Option<Result<Frame, Utf8Error>> {
    let (line_end, next_start) = find_eol(buffer)?;

    let line = buffer.split_to(line_end).freeze();
    buffer.advance(next_start - line_end);

    Some(decode_line(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(input: &[u8]) -> Vec<Frame> {
        let mut buffer = BytesMut::from(input);
        let mut out = Vec::new();
        while let Some(frame) = next_frame(&mut buffer) {
            out.push(frame.expect("valid utf-8"));
        }
        out
    }

    fn field(name: FieldName, value: &'static str) -> Frame {
        Frame::Field {
            name,
            value: Str::from_static(value),
        }
    }

    #[test]
    fn splits_name_and_value_on_first_colon() {
        assert_eq!(
            frames(b"data: a: b\n"),
            vec![field(FieldName::Data, "a: b")]
        );
    }

    #[test]
    fn strips_only_one_leading_space() {
        assert_eq!(
            frames(b"data:  two\ndata:none\n"),
            vec![field(FieldName::Data, " two"), field(FieldName::Data, "none")]
        );
    }

    #[test]
    fn bare_name_has_empty_value() {
        assert_eq!(frames(b"data\n"), vec![field(FieldName::Data, "")]);
    }

    #[test]
    fn comments_and_unknown_fields() {
        assert_eq!(
            frames(b": keep-alive\nfoo: bar\n"),
            vec![Frame::Comment, field(FieldName::Unknown, "bar")]
        );
    }

    #[test]
    fn all_line_terminators() {
        assert_eq!(
            frames(b"id: 1\r\nid: 2\rid: 3\n\r\n"),
            vec![
                field(FieldName::Id, "1"),
                field(FieldName::Id, "2"),
                field(FieldName::Id, "3"),
                Frame::Boundary,
            ]
        );
    }

    #[test]
    fn trailing_cr_waits_for_more_input() {
        let mut buffer = BytesMut::from(&b"data: x\r"[..]);
        assert!(next_frame(&mut buffer).is_none());
        assert_eq!(&buffer[..], b"data: x\r");
    }

    #[test]
    fn incomplete_line_is_left_in_buffer() {
        let mut buffer = BytesMut::from(&b"event: a\nda"[..]);
        assert_eq!(
            next_frame(&mut buffer).map(Result::unwrap),
            Some(field(FieldName::Event, "a"))
        );
        assert!(next_frame(&mut buffer).is_none());
        assert_eq!(&buffer[..], b"da");
    }

    #[test]
    fn invalid_utf8_value_is_an_error() {
        let mut buffer = BytesMut::from(&b"data: \xff\xfe\n"[..]);
        assert!(matches!(next_frame(&mut buffer), Some(Err(_))));
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_utf8_outside_values_is_an_error() {
        for line in [
            &b": keep\xffalive\n"[..],
            &b"dat\xc3\x28\n"[..],
            &b"\xfe\xff: value\n"[..],
        ] {
            let mut buffer = BytesMut::from(line);
            assert!(matches!(next_frame(&mut buffer), Some(Err(_))), "{line:?}");
            assert!(buffer.is_empty());
        }
    }

    #[test]
    fn multibyte_values_survive_splitting() {
        assert_eq!(
            frames("data: héllo wörld\nevent:日本\n".as_bytes()),
            vec![field(FieldName::Data, "héllo wörld"), field(FieldName::Event, "日本")]
        );
    }
}
