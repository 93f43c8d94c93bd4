//! Depth-first emission of a tag tree back to bytes, mirroring the
//! decoder's recursive structure so the two stay easy to read side by side.

use log::{debug, trace};

use crate::byteio::Writer;
use crate::codec::{self, CompressionMode};
use crate::error::Error;
use crate::kind::Kind;
use crate::progress::{ProgressRange, ProgressReporter};
use crate::tag::{Node, Value};

/// Options accepted by [`encode_with_options`]. `DecodeOptions`'s sibling;
/// `compression` left as `None` emits a plain, uncompressed NBT blob.
#[derive(Default)]
pub struct EncodeOptions<'a> {
    pub progress: Option<&'a mut dyn crate::progress::ProgressSink>,
    pub cancel: Option<&'a dyn crate::progress::CancelToken>,
    pub progress_class: crate::progress::ProgressClass,
    pub progress_range: ProgressRange,
    pub compression: Option<CompressionMode>,
}

/// Encodes `root` to bytes with no compression wrapper.
pub fn encode(root: &Node) -> Result<Vec<u8>, Error> {
    encode_with_options(root, EncodeOptions::default())
}

/// Encodes `root` to bytes, applying `options.compression` if set, and
/// reporting progress/cancellation the same way
/// [`crate::decoder::decode_with_options`] does.
pub fn encode_with_options<'a>(root: &Node, options: EncodeOptions<'a>) -> Result<Vec<u8>, Error> {
    let total = count_nodes(root);
    debug!("encoding a tree of {total} node(s)");

    let mut reporter = ProgressReporter::new(
        options.progress,
        options.cancel,
        options.progress_class,
        options.progress_range,
    );

    let mut writer = Writer::new();
    let mut visited = 0usize;
    write_value(&mut writer, root, false, total, &mut visited, &mut reporter)?;

    let plain = writer.into_bytes();
    match options.compression {
        Some(mode) => codec::compress(&plain, mode),
        None => Ok(plain),
    }
}

fn count_nodes(node: &Node) -> usize {
    1 + match node.value() {
        Value::List { children, .. } | Value::Compound { children } => {
            children.iter().map(count_nodes).sum()
        }
        _ => 0,
    }
}

/// Writes one tagged value, including its kind byte and (unless
/// `skip_key`, i.e. this is a list element) its key.
fn write_value(
    writer: &mut Writer,
    node: &Node,
    skip_key: bool,
    total: usize,
    visited: &mut usize,
    reporter: &mut ProgressReporter<'_>,
) -> Result<(), Error> {
    reporter.check_cancelled()?;
    *visited += 1;
    reporter.report(*visited, total, "encoding NBT");

    let kind = node.kind();
    writer.u8(kind.header_byte());
    if !skip_key {
        writer.mutf8_string(node.key().unwrap_or(""));
    }

    match node.value() {
        Value::Byte(v) => writer.i8(*v),
        Value::Short(v) => writer.i16(*v),
        Value::Int(v) => writer.i32(*v),
        Value::Long(v) => writer.i64(*v),
        Value::Float(v) => writer.f32(*v),
        Value::Double(v) => writer.f64(*v),
        Value::ByteArray(bytes) => {
            writer.i32(bytes.len() as i32);
            writer.bytes(bytes);
        }
        Value::String(s) => writer.mutf8_string(s),
        Value::IntArray(values) => {
            writer.i32(values.len() as i32);
            for v in values {
                writer.i32(*v);
            }
        }
        Value::LongArray(values) => {
            writer.i32(values.len() as i32);
            for v in values {
                writer.i64(*v);
            }
        }
        Value::List { elem_kind, children } => {
            writer.u8(elem_kind.header_byte());
            writer.i32(children.len() as i32);
            for child in children {
                write_value(writer, child, true, total, visited, reporter)?;
            }
        }
        Value::Compound { children } => {
            for child in children {
                write_value(writer, child, false, total, visited, reporter)?;
            }
            writer.u8(Kind::End.header_byte());
        }
    }

    trace!("wrote {kind} tag");
    Ok(())
}
