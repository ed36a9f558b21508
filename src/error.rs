//! Error types for base8 encoding and decoding.

use std::io;

use thiserror::Error;

/// Error variants for base8 operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input was found at byte `offset`.
    ///
    /// The offset counts from the start of the buffer passed to the decode
    /// call, or from the start of the stream for [`crate::Decoder`].
    #[error("illegal base8 data at input byte {offset}")]
    CorruptInput {
        /// Position of the defect in the encoded input.
        offset: u64,
        /// Valid bytes decoded from the quanta before the defect.
        decoded: usize,
    },

    /// The source ended in the middle of a quantum.
    #[error("unexpected end of base8 data")]
    UnexpectedEnd,

    /// A write was attempted after the encoder was closed.
    #[error("base8 encoder is closed")]
    Closed,

    /// The caller-supplied output buffer cannot hold the result.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes provided.
        available: usize,
    },

    /// An I/O error occurred in the underlying reader or writer.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Offset of the first corrupt byte, if this is a corruption error.
    pub fn corrupt_offset(&self) -> Option<u64> {
        match self {
            Error::CorruptInput { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Number of valid bytes that preceded the corruption, if this is a
    /// corruption error.
    pub fn decoded_before(&self) -> Option<usize> {
        match self {
            Error::CorruptInput { decoded, .. } => Some(*decoded),
            _ => None,
        }
    }

    /// Recover a base8 error carried inside an [`io::Error`] produced by the
    /// streaming encoder or decoder.
    pub fn from_io(err: &io::Error) -> Option<&Error> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<Error>())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::Io(inner) => return inner,
            Error::CorruptInput { .. } => io::ErrorKind::InvalidData,
            Error::UnexpectedEnd => io::ErrorKind::UnexpectedEof,
            Error::OutputTooSmall { .. } => io::ErrorKind::InvalidInput,
            Error::Closed => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// A specialized Result type for base8 operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal condition remembered by a streaming encoder or decoder.
///
/// Once set it is replayed on every later call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sticky {
    /// Clean end of the encoded stream.
    Eof,
    /// Encoder finalized by `close`.
    Closed,
    Corrupt { offset: u64, decoded: usize },
    UnexpectedEnd,
    /// Failure reported by the wrapped reader or writer.
    Io { kind: io::ErrorKind, message: String },
}

impl Sticky {
    pub(crate) fn from_io(err: &io::Error) -> Self {
        match Error::from_io(err) {
            Some(Error::CorruptInput { offset, decoded }) => Sticky::Corrupt {
                offset: *offset,
                decoded: *decoded,
            },
            Some(Error::UnexpectedEnd) => Sticky::UnexpectedEnd,
            _ => Sticky::Io {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    /// Rebuild the error this state stands for. `Eof` has no error.
    pub(crate) fn to_io(&self) -> Option<io::Error> {
        match self {
            Sticky::Eof => None,
            Sticky::Closed => Some(Error::Closed.into()),
            Sticky::Corrupt { offset, decoded } => Some(
                Error::CorruptInput {
                    offset: *offset,
                    decoded: *decoded,
                }
                .into(),
            ),
            Sticky::UnexpectedEnd => Some(Error::UnexpectedEnd.into()),
            Sticky::Io { kind, message } => Some(io::Error::new(*kind, message.clone())),
        }
    }
}
