//! The MCA region container: a sector-indexed directory of up to 1024 NBT
//! chunks, each independently compressed. A [`Region`] holds raw
//! (still-compressed) per-slot chunk bytes; [`Region::parse_all`] hands
//! each one to [`crate::decoder`], which already knows how to sniff and
//! strip GZIP/ZLIB/raw wrappers, so this module never touches compression
//! itself except when a caller asks it to encode a tree straight into a
//! slot.

use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use crate::codec::CompressionMode;
use crate::decoder;
use crate::encoder::{self, EncodeOptions};
use crate::error::Error;
use crate::io::ByteLoader;
use crate::tag::Node;

const SECTOR_SIZE: usize = 4096;
const HEADER_SECTORS: u32 = 2;
const SLOT_COUNT: usize = 1024;

/// How strictly [`Region::read`] treats a location entry whose sectors
/// extend past the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// A chunk's sectors must lie entirely within the file; a bad entry
    /// fails the whole read. Matches real-world Anvil files.
    Strict,
    /// A chunk whose sectors run past the end of the file is treated as
    /// an absent (null) slot instead of failing the read.
    Lenient,
}

/// An in-memory MCA region: 1024 chunk slots, each either empty or
/// holding raw (possibly compressed) chunk bytes plus its own timestamp.
#[derive(Debug, Clone)]
pub struct Region {
    chunks: Vec<Option<Vec<u8>>>,
    timestamps: Vec<i32>,
    coordinates: Option<(i32, i32)>,
}

impl Region {
    /// A region with all 1024 slots empty and all timestamps zero.
    pub fn empty() -> Region {
        Region {
            chunks: vec![None; SLOT_COUNT],
            timestamps: vec![0; SLOT_COUNT],
            coordinates: None,
        }
    }

    pub fn coordinates(&self) -> Option<(i32, i32)> {
        self.coordinates
    }

    pub fn set_coordinates(&mut self, coordinates: Option<(i32, i32)>) {
        self.coordinates = coordinates;
    }

    pub fn timestamp(&self, index: usize) -> Option<i32> {
        self.timestamps.get(index).copied()
    }

    pub fn set_timestamp(&mut self, index: usize, epoch_seconds: i32) {
        if let Some(slot) = self.timestamps.get_mut(index) {
            *slot = epoch_seconds;
        }
    }

    /// The raw (possibly still-compressed) bytes in slot `index`, or
    /// `None` if the slot is empty.
    pub fn chunk_bytes(&self, index: usize) -> Option<&[u8]> {
        self.chunks.get(index)?.as_deref()
    }

    /// Stores already-compressed bytes directly into a slot, bypassing
    /// the encoder. Used when re-packing bytes read from another region.
    pub fn set_chunk_bytes(&mut self, index: usize, bytes: Vec<u8>) {
        if index < SLOT_COUNT {
            self.chunks[index] = Some(bytes);
        }
    }

    pub fn clear_chunk(&mut self, index: usize) {
        if index < SLOT_COUNT {
            self.chunks[index] = None;
        }
    }

    /// Encodes `tree` and ZLIB-compresses it into slot `index`, matching
    /// the compression kind [`Region::write`] always emits.
    pub fn set_chunk_tree(&mut self, index: usize, tree: &Node) -> Result<(), Error> {
        let options = EncodeOptions {
            compression: Some(CompressionMode::Zlib),
            ..Default::default()
        };
        let bytes = encoder::encode_with_options(tree, options)?;
        self.set_chunk_bytes(index, bytes);
        Ok(())
    }

    /// Reads a region from `bytes` in strict mode (the default; matches
    /// real-world Anvil files).
    pub fn read(bytes: &[u8]) -> Result<Region, Error> {
        Region::read_with_mode(bytes, ReadMode::Strict)
    }

    pub fn read_strict(bytes: &[u8]) -> Result<Region, Error> {
        Region::read_with_mode(bytes, ReadMode::Strict)
    }

    pub fn read_lenient(bytes: &[u8]) -> Result<Region, Error> {
        Region::read_with_mode(bytes, ReadMode::Lenient)
    }

    pub fn read_with_mode(bytes: &[u8], mode: ReadMode) -> Result<Region, Error> {
        if bytes.len() < 2 * SECTOR_SIZE {
            return Err(Error::invalid_data(
                0,
                format!("MCA file is {} byte(s), shorter than the 8192-byte header", bytes.len()),
            ));
        }

        let mut region = Region::empty();
        for i in 0..SLOT_COUNT {
            let entry = &bytes[i * 4..i * 4 + 4];
            let sector_offset = ((entry[0] as u32) << 16) | ((entry[1] as u32) << 8) | entry[2] as u32;
            let sector_count = entry[3] as u32;
            if sector_offset == 0 && sector_count == 0 {
                continue;
            }

            let byte_offset = sector_offset as usize * SECTOR_SIZE;
            let byte_end = byte_offset + sector_count as usize * SECTOR_SIZE;
            if byte_end > bytes.len() {
                match mode {
                    ReadMode::Lenient => {
                        warn!("slot {i} sector range [{byte_offset}, {byte_end}) runs past end of file, nulling it");
                        continue;
                    }
                    ReadMode::Strict => {
                        return Err(Error::invalid_data(
                            byte_offset,
                            format!("slot {i} sector range runs past end of file"),
                        ))
                    }
                }
            }

            region.chunks[i] = Some(read_chunk_payload(bytes, byte_offset, byte_end, i, mode)?);
        }

        for i in 0..SLOT_COUNT {
            let offset = SECTOR_SIZE + i * 4;
            region.timestamps[i] = BigEndian::read_i32(&bytes[offset..offset + 4]);
        }

        debug!(
            "read MCA region: {} occupied slot(s) of {SLOT_COUNT}",
            region.chunks.iter().filter(|c| c.is_some()).count()
        );
        Ok(region)
    }

    /// Loads a region from `path` via `loader`, deriving `(x, z)`
    /// coordinates from a `r.<x>.<z>.mca`-shaped filename when present.
    pub fn read_from_path(
        loader: &dyn ByteLoader,
        path: &Path,
        mode: ReadMode,
    ) -> Result<Region, Error> {
        let bytes = loader.load(path)?;
        let mut region = Region::read_with_mode(&bytes, mode)?;
        region.coordinates = parse_coordinates_from_filename(path);
        Ok(region)
    }

    /// Serializes this region to bytes: an 8192-byte header (location
    /// table + timestamp table) followed by sector-aligned chunk
    /// payloads, each ZLIB-kind-tagged, matching real-world Anvil files;
    /// see `set_chunk_tree`/`set_chunk_bytes` for how a slot's bytes get
    /// there.
    ///
    /// Per-slot timestamps are preserved exactly as recorded rather than
    /// overwritten with a single shared value.
    pub fn write(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 2 * SECTOR_SIZE];
        let mut locations = [0u8; SECTOR_SIZE];
        let mut current_sector = HEADER_SECTORS;

        for (i, chunk) in self.chunks.iter().enumerate() {
            let Some(bytes) = chunk else { continue };

            let start_byte = current_sector as usize * SECTOR_SIZE;
            if buf.len() < start_byte {
                buf.resize(start_byte, 0);
            }

            let size = bytes.len();
            let total_len = 4 + 1 + size;
            let mut header = [0u8; 5];
            BigEndian::write_u32(&mut header[0..4], (size + 1) as u32);
            header[4] = 2; // ZLIB
            buf.extend_from_slice(&header);
            buf.extend_from_slice(bytes);

            let written_end = start_byte + total_len - 1;
            let new_sector = (written_end >> 12) as u32 + 1;
            let sector_count = new_sector - current_sector;

            let entry = i * 4;
            locations[entry] = (current_sector >> 16) as u8;
            locations[entry + 1] = (current_sector >> 8) as u8;
            locations[entry + 2] = current_sector as u8;
            locations[entry + 3] = sector_count as u8;

            current_sector = new_sector;
        }

        if buf.len() % SECTOR_SIZE != 0 {
            let padded = (buf.len() / SECTOR_SIZE + 1) * SECTOR_SIZE;
            buf.resize(padded, 0);
        }

        buf[0..SECTOR_SIZE].copy_from_slice(&locations);
        for (i, &epoch) in self.timestamps.iter().enumerate() {
            let offset = SECTOR_SIZE + i * 4;
            BigEndian::write_i32(&mut buf[offset..offset + 4], epoch);
        }

        debug!(
            "wrote MCA region: {} occupied slot(s), {} byte(s) total",
            self.chunks.iter().filter(|c| c.is_some()).count(),
            buf.len()
        );
        buf
    }

    /// Decodes every occupied slot's raw bytes into a tag tree. A single
    /// slot's decode failure is recorded for that slot rather than
    /// aborting the whole region; index `i` is `None` for an empty slot.
    pub fn parse_all(&self) -> Vec<Option<Result<Node, Error>>> {
        self.chunks
            .iter()
            .map(|chunk| chunk.as_deref().map(decoder::decode))
            .collect()
    }
}

fn read_chunk_payload(
    bytes: &[u8],
    byte_offset: usize,
    byte_end: usize,
    slot: usize,
    mode: ReadMode,
) -> Result<Vec<u8>, Error> {
    if byte_offset + 5 > byte_end {
        return Err(Error::early_eof(byte_offset));
    }
    let length = BigEndian::read_u32(&bytes[byte_offset..byte_offset + 4]) as usize;
    if length == 0 {
        return Err(Error::invalid_data(byte_offset, format!("slot {slot} has zero-length chunk header")));
    }
    let kind_byte = bytes[byte_offset + 4];
    let kind_known = matches!(kind_byte, 1 | 2 | 3);
    if !kind_known || (mode == ReadMode::Strict && kind_byte != 2) {
        return Err(Error::invalid_data(
            byte_offset + 4,
            format!("slot {slot} has unexpected compression kind byte {kind_byte}"),
        ));
    }

    let payload_start = byte_offset + 5;
    let payload_len = length - 1;
    let payload_end = payload_start + payload_len;
    if payload_end > byte_end || payload_end > bytes.len() {
        return Err(Error::early_eof(payload_start));
    }
    Ok(bytes[payload_start..payload_end].to_vec())
}

/// Parses `(x, z)` out of a `r.<x>.<z>.mca`-shaped filename (the last
/// path component); returns `None` for any other shape.
fn parse_coordinates_from_filename(path: &Path) -> Option<(i32, i32)> {
    let name = path.file_name()?.to_str()?;
    let mut parts = name.split('.');
    if parts.next()? != "r" {
        return None;
    }
    let x: i32 = parts.next()?.parse().ok()?;
    let z: i32 = parts.next()?.parse().ok()?;
    if parts.next()? != "mca" || parts.next().is_some() {
        return None;
    }
    Some((x, z))
}
