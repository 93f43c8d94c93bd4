//! Recursive descent over tag types, turning a byte slice into a tag tree.
//! Bounds-checked at every step; untrusted lengths are validated against
//! the remaining buffer before any allocation.

use log::{debug, trace, warn};

use crate::byteio::Reader;
use crate::codec::{self, CompressionMode};
use crate::error::Error;
use crate::kind::Kind;
use crate::progress::{ProgressRange, ProgressReporter};
use crate::tag::{Node, Value};

/// Options accepted by [`decode_with_options`]; `default()` reproduces
/// plain [`decode`] behavior.
#[derive(Default)]
pub struct DecodeOptions<'a> {
    pub progress: Option<&'a mut dyn crate::progress::ProgressSink>,
    pub cancel: Option<&'a dyn crate::progress::CancelToken>,
    pub progress_class: crate::progress::ProgressClass,
    pub progress_range: ProgressRange,
}

/// Decodes `bytes` into a tag tree, auto-detecting GZIP/ZLIB compression
/// and discarding any leftover-data warning. Use [`decode_with_warnings`]
/// to observe it instead.
pub fn decode(bytes: &[u8]) -> Result<Node, Error> {
    decode_with_options(bytes, DecodeOptions::default()).map(|(node, _warning)| node)
}

/// Like [`decode`], but surfaces `Error::LeftoverData` as a side channel
/// rather than silently discarding it.
pub fn decode_with_warnings(bytes: &[u8]) -> Result<(Node, Option<Error>), Error> {
    decode_with_options(bytes, DecodeOptions::default())
}

pub fn decode_with_options<'a>(
    bytes: &[u8],
    options: DecodeOptions<'a>,
) -> Result<(Node, Option<Error>), Error> {
    let mode = CompressionMode::sniff(bytes);
    debug!("decoding {} byte(s), sniffed compression mode {:?}", bytes.len(), mode);
    // Raw here just means "no GZIP/ZLIB wrapper found" -- treat the input as
    // already-plain NBT instead of running it through the raw-deflate codec,
    // so an in-memory, never-compressed tree round-trips through encode/decode.
    let owned;
    let plain: &[u8] = if mode == CompressionMode::Raw {
        bytes
    } else {
        owned = codec::decompress(bytes, mode)?;
        &owned
    };

    let mut reporter = ProgressReporter::new(
        options.progress,
        options.cancel,
        options.progress_class,
        options.progress_range,
    );

    let mut reader = Reader::new(plain);
    reporter.check_cancelled()?;
    let root_kind_byte = reader.u8()?;
    let root_kind = Kind::try_from_byte(root_kind_byte, 0)?;
    let root = parse_value(&mut reader, root_kind, false, &mut reporter)?;

    let warning = if !reader.at_end() {
        let leftover = reader.remaining();
        warn!("{} leftover byte(s) after a fully-parsed root tag", leftover);
        Some(Error::LeftoverData(leftover))
    } else {
        None
    };

    Ok((root, warning))
}

// Parses one tagged value of known `kind`, reading its key first unless
// `skip_key` (list elements are unkeyed on the wire).
fn parse_value(
    reader: &mut Reader<'_>,
    kind: Kind,
    skip_key: bool,
    reporter: &mut ProgressReporter<'_>,
) -> Result<Node, Error> {
    reporter.check_cancelled()?;
    reporter.report(reader.position(), reader.len(), "parsing NBT");

    let key = if skip_key { None } else { Some(reader.mutf8_string()?) };

    let value = match kind {
        Kind::End => {
            return Err(Error::invalid_data(reader.position(), "unexpected End tag"))
        }
        Kind::Byte => Value::Byte(reader.i8()?),
        Kind::Short => Value::Short(reader.i16()?),
        Kind::Int => Value::Int(reader.i32()?),
        Kind::Long => Value::Long(reader.i64()?),
        Kind::Float => Value::Float(reader.f32()?),
        Kind::Double => Value::Double(reader.f64()?),
        Kind::ByteArray => Value::ByteArray(parse_byte_array(reader)?),
        Kind::String => Value::String(reader.mutf8_string()?),
        Kind::IntArray => Value::IntArray(parse_int_array(reader)?),
        Kind::LongArray => Value::LongArray(parse_long_array(reader)?),
        Kind::List => parse_list(reader, reporter)?,
        Kind::Compound => parse_compound(reader, reporter)?,
    };

    trace!("parsed {:?} tag{}", kind, key.as_deref().map_or(String::new(), |k| format!(" {k:?}")));
    Ok(Node::new(key, value))
}

fn parse_byte_array(reader: &mut Reader<'_>) -> Result<Vec<u8>, Error> {
    let len = parse_array_length(reader)?;
    let bytes = reader.bytes(len)?;
    Ok(bytes.to_vec())
}

fn parse_int_array(reader: &mut Reader<'_>) -> Result<Vec<i32>, Error> {
    let len = parse_array_length(reader)?;
    bounds_check_array(reader, len, 4)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(reader.i32()?);
    }
    Ok(values)
}

fn parse_long_array(reader: &mut Reader<'_>) -> Result<Vec<i64>, Error> {
    let len = parse_array_length(reader)?;
    bounds_check_array(reader, len, 8)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(reader.i64()?);
    }
    Ok(values)
}

// Reads a 32-bit array length and rejects negative values before the
// caller allocates anything.
fn parse_array_length(reader: &mut Reader<'_>) -> Result<usize, Error> {
    let position = reader.position();
    let len = reader.i32()?;
    if len < 0 {
        return Err(Error::invalid_data(position, format!("negative array length {len}")));
    }
    Ok(len as usize)
}

// Validates count * elem_size against the bytes actually remaining before
// an int/long array loop allocates `count` elements, so a huge element
// count fails cheaply instead of attempting a giant allocation.
fn bounds_check_array(reader: &Reader<'_>, count: usize, elem_size: usize) -> Result<(), Error> {
    let needed = count.checked_mul(elem_size).ok_or_else(|| {
        Error::invalid_data(reader.position(), "array length overflows a byte count")
    })?;
    if needed > reader.remaining() {
        return Err(Error::early_eof(reader.position()));
    }
    Ok(())
}

fn parse_list(reader: &mut Reader<'_>, reporter: &mut ProgressReporter<'_>) -> Result<Value, Error> {
    let elem_kind_position = reader.position();
    let elem_kind_byte = reader.u8()?;
    let elem_kind = Kind::try_from_byte(elem_kind_byte, elem_kind_position)?;
    let len = parse_array_length(reader)?;

    if elem_kind == Kind::End && len != 0 {
        return Err(Error::invalid_data(
            elem_kind_position,
            "a non-empty list cannot have element kind End",
        ));
    }

    // A minimum-size bound per element (every kind is at least 1 byte on
    // the wire) rejects an adversarial huge length before the loop below
    // ever allocates per-element storage.
    if len > reader.remaining() {
        return Err(Error::early_eof(reader.position()));
    }

    let mut children = Vec::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        children.push(parse_value(reader, elem_kind, true, reporter)?);
    }
    Ok(Value::List { elem_kind, children })
}

fn parse_compound(reader: &mut Reader<'_>, reporter: &mut ProgressReporter<'_>) -> Result<Value, Error> {
    let mut children = Vec::new();
    loop {
        let kind_position = reader.position();
        let kind_byte = reader.u8()?;
        let kind = Kind::try_from_byte(kind_byte, kind_position)?;
        if kind == Kind::End {
            break;
        }
        children.push(parse_value(reader, kind, false, reporter)?);
    }
    Ok(Value::Compound { children })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        s.split_whitespace()
            .map(|byte| u8::from_str_radix(byte, 16).unwrap())
            .collect()
    }

    #[test]
    fn scenario_1_hello_world_compound() {
        let bytes = hex(
            "0A 00 0B 68 65 6C 6C 6F 20 77 6F 72 6C 64 08 00 04 6E 61 6D 65 00 09 42 61 6E 61 6E 72 61 6D 61 00",
        );
        let root = decode(&bytes).unwrap();
        assert_eq!(root.kind(), Kind::Compound);
        assert_eq!(root.key(), Some("hello world"));
        let name = root.child_by_key("name").unwrap();
        assert_eq!(name.as_string(), Some("Bananrama"));
    }

    #[test]
    fn scenario_2_decoder_accepts_any_root_kind() {
        let bytes = hex("01 00 01 61 7F");
        let root = decode(&bytes).unwrap();
        assert_eq!(root.kind(), Kind::Byte);
        assert_eq!(root.key(), Some("a"));
        assert_eq!(root.as_byte(), Some(0x7F));
    }

    #[test]
    fn scenario_3_list_of_ints() {
        let bytes = hex("09 00 04 6C 69 73 74 03 00 00 00 02 00 00 00 01 00 00 00 02");
        let root = decode(&bytes).unwrap();
        assert_eq!(root.kind(), Kind::List);
        assert_eq!(root.key(), Some("list"));
        assert_eq!(root.list_elem_kind(), Some(Kind::Int));
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.child_at(0).unwrap().as_int(), Some(1));
        assert_eq!(root.child_at(1).unwrap().as_int(), Some(2));
    }

    #[test]
    fn scenario_4_empty_compound_with_empty_key() {
        let bytes = hex("0A 00 00 00");
        let root = decode(&bytes).unwrap();
        assert_eq!(root.kind(), Kind::Compound);
        assert_eq!(root.key(), Some(""));
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn scenario_5_list_of_empty_compounds() {
        let bytes = hex(
            "0A 00 00 09 00 01 78 0A 00 00 00 02 00 00 00 00 00 00 00 00",
        );
        let root = decode(&bytes).unwrap();
        let list = root.child_by_key("x").unwrap();
        assert_eq!(list.kind(), Kind::List);
        assert_eq!(list.list_elem_kind(), Some(Kind::Compound));
        assert_eq!(list.child_count(), 2);
        for i in 0..2 {
            assert_eq!(list.child_at(i).unwrap().child_count(), 0);
        }
    }

    #[test]
    fn adversarial_truncated_header_is_early_eof() {
        let bytes = hex("01");
        assert!(matches!(decode(&bytes), Err(Error::EarlyEof { .. })));
    }

    #[test]
    fn adversarial_huge_list_length_fails_before_allocating() {
        // TAG_List, key "", elem=Compound(10), length=0x7FFFFFFF, no data follows.
        let mut bytes = hex("09 00 00 0A 7F FF FF FF");
        bytes.truncate(8);
        assert!(matches!(decode(&bytes), Err(Error::EarlyEof { .. })));
    }

    #[test]
    fn adversarial_string_length_overruns_buffer() {
        // TAG_String, key "", payload length 0xFFFF but only 3 bytes follow.
        let bytes = hex("08 00 00 FF FF 61 62 63");
        assert!(matches!(decode(&bytes), Err(Error::EarlyEof { .. })));
    }

    #[test]
    fn adversarial_compound_missing_terminator() {
        let bytes = hex("0A 00 00 01 00 01 61 7F");
        assert!(matches!(decode(&bytes), Err(Error::EarlyEof { .. })));
    }

    #[test]
    fn leftover_data_is_reported_but_not_fatal() {
        let mut bytes = hex("01 00 01 61 7F");
        bytes.push(0xFF);
        let (root, warning) = decode_with_warnings(&bytes).unwrap();
        assert_eq!(root.as_byte(), Some(0x7F));
        assert!(matches!(warning, Some(Error::LeftoverData(1))));
    }

    #[test]
    fn negative_array_length_is_rejected() {
        // TAG_IntArray, key "", length -1.
        let bytes = hex("0B 00 00 FF FF FF FF");
        assert!(matches!(decode(&bytes), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn non_empty_list_of_end_is_rejected() {
        // TAG_List, key "", elem=End(0), length=1.
        let bytes = hex("09 00 00 00 00 00 00 01");
        assert!(matches!(decode(&bytes), Err(Error::InvalidData { .. })));
    }
}
