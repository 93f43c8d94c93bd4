use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Every caller-observable failure mode of the decoder, encoder, tree
/// utilities, and MCA container codec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("internal error: {0}")]
    Internal(&'static str),

    #[error("unexpected end of input at byte {position}")]
    EarlyEof { position: usize },

    #[error("invalid tag id {id} at byte {position}")]
    InvalidTag { id: u8, position: usize },

    #[error("invalid data at byte {position}: {reason}")]
    InvalidData { position: usize, reason: String },

    #[error("{0} leftover byte(s) after a fully-parsed root tag")]
    LeftoverData(usize),

    #[error("failed to (de)compress: {0}")]
    UncompressError(String),

    #[error("buffer of {available} bytes is too small, needs at least {needed}")]
    BufferOverflow { needed: usize, available: usize },

    #[error("decode/encode was cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn early_eof(position: usize) -> Self {
        Error::EarlyEof { position }
    }

    pub(crate) fn invalid_tag(id: u8, position: usize) -> Self {
        Error::InvalidTag { id, position }
    }

    pub(crate) fn invalid_data(position: usize, reason: impl Into<String>) -> Self {
        Error::InvalidData {
            position,
            reason: reason.into(),
        }
    }

    /// True if this error is a cancellation raised by a `CancelToken`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
