//! GZIP/ZLIB/raw-deflate (de)compression on top of `flate2`, the same
//! crate the teacher repo already reaches for
//! (`flate2::read::{GzDecoder, ZlibDecoder}`).

use std::io::{Read, Write};

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::Compression;

use crate::error::Error;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const ZLIB_MAGIC: u8 = 0x78;

/// Which of the three wire formats a compressed NBT/MCA payload uses.
/// `Raw` is deflate with no GZIP/ZLIB wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Gzip,
    Zlib,
    Raw,
}

impl CompressionMode {
    /// `1F 8B` is GZIP, a leading `0x78` is ZLIB, anything else is raw.
    pub fn sniff(bytes: &[u8]) -> CompressionMode {
        if bytes.starts_with(&GZIP_MAGIC) {
            CompressionMode::Gzip
        } else if bytes.first() == Some(&ZLIB_MAGIC) {
            CompressionMode::Zlib
        } else {
            CompressionMode::Raw
        }
    }
}

/// Decompresses `bytes` according to `mode`, growing the output buffer as
/// needed and tolerating an unknown uncompressed size.
pub fn decompress(bytes: &[u8], mode: CompressionMode) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    let result = match mode {
        CompressionMode::Gzip => GzDecoder::new(bytes).read_to_end(&mut out),
        CompressionMode::Zlib => ZlibDecoder::new(bytes).read_to_end(&mut out),
        CompressionMode::Raw => DeflateDecoder::new(bytes).read_to_end(&mut out),
    };
    result
        .map(|_| out)
        .map_err(|e| Error::UncompressError(e.to_string()))
}

/// Compresses `bytes` with `mode`, using the highest compression level.
pub fn compress(bytes: &[u8], mode: CompressionMode) -> Result<Vec<u8>, Error> {
    let level = Compression::best();
    let mut out = Vec::with_capacity(bytes.len());
    let result = match mode {
        CompressionMode::Gzip => {
            let mut encoder = GzEncoder::new(&mut out, level);
            encoder.write_all(bytes).and_then(|_| encoder.try_finish())
        }
        CompressionMode::Zlib => {
            let mut encoder = ZlibEncoder::new(&mut out, level);
            encoder.write_all(bytes).and_then(|_| encoder.try_finish())
        }
        CompressionMode::Raw => {
            let mut encoder = DeflateEncoder::new(&mut out, level);
            encoder.write_all(bytes).and_then(|_| encoder.try_finish())
        }
    };
    result
        .map(|_| out)
        .map_err(|e| Error::UncompressError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_gzip_from_magic_bytes() {
        assert_eq!(CompressionMode::sniff(&[0x1F, 0x8B, 0, 0]), CompressionMode::Gzip);
    }

    #[test]
    fn sniffs_zlib_from_leading_byte() {
        assert_eq!(CompressionMode::sniff(&[0x78, 0x9C]), CompressionMode::Zlib);
    }

    #[test]
    fn falls_back_to_raw() {
        assert_eq!(CompressionMode::sniff(&[0x0A, 0x00]), CompressionMode::Raw);
        assert_eq!(CompressionMode::sniff(&[]), CompressionMode::Raw);
    }

    #[test]
    fn each_mode_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(4);
        for mode in [CompressionMode::Gzip, CompressionMode::Zlib, CompressionMode::Raw] {
            let compressed = compress(&data, mode).unwrap();
            let decompressed = decompress(&compressed, mode).unwrap();
            assert_eq!(decompressed, data);
        }
    }
}
