//! NBT tag trees and the MCA region-file container that packages them.
//!
//! The three pieces this crate is built around:
//! - [`tag`]/[`tree`]: an owned, mutable rose tree of typed NBT values.
//! - [`decoder`]/[`encoder`]: the recursive binary codec between that tree
//!   and bytes, with optional GZIP/ZLIB wrapping via [`codec`].
//! - [`mca`]: the sector-indexed 1024-chunk region file container.
//!
//! [`progress`] and [`io`] are the optional host collaborators (progress
//! reporting/cancellation, and file-path I/O) described in the design
//! notes' external interfaces section.

mod byteio;
mod mutf8;

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod io;
pub mod kind;
pub mod mca;
pub mod progress;
pub mod tag;
mod tree;

pub use codec::CompressionMode;
pub use decoder::{decode, decode_with_options, decode_with_warnings, DecodeOptions};
pub use encoder::{encode, encode_with_options, EncodeOptions};
pub use error::{Error, Result};
pub use io::{ByteLoader, ByteWriter, FsIo};
pub use kind::Kind;
pub use mca::{ReadMode, Region};
pub use mutf8::{decode as mutf8_decode, encode as mutf8_encode};
pub use progress::{AtomicCancelToken, CancelToken, ProgressClass, ProgressRange, ProgressSink};
pub use tag::{Node, Value};
