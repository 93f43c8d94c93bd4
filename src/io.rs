//! Small traits so hosts can inject in-memory, real-filesystem, or
//! virtual-filesystem implementations, plus a `std::fs`-backed default.

use std::fs;
use std::path::Path;

use crate::error::Error;

/// Returns the bytes at `path`.
pub trait ByteLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>, Error>;
}

/// Writes `bytes` to `path`, creating parent directories and replacing
/// any existing file.
pub trait ByteWriter {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), Error>;
}

/// The default `std::fs`-backed implementation of both collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsIo;

impl ByteLoader for FsIo {
    fn load(&self, path: &Path) -> Result<Vec<u8>, Error> {
        Ok(fs::read(path)?)
    }
}

impl ByteWriter for FsIo {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::write(path, bytes)?)
    }
}
