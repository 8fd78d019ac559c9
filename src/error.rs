//! Contains [`Error`] and the corresponding [`Result`].

use std::{error::Error as StdError, fmt, io, result};

use rowbinary_types::SchemaError;

/// A result with a specified [`Error`] type.
pub type Result<T, E = Error> = result::Result<T, E>;

type BoxedError = Box<dyn StdError + Send + Sync>;

/// Represents all possible errors raised by this crate.
///
/// Variants are grouped by the six kinds named in the wire-format
/// specification: schema, validation, codec, state, bounds, and I/O.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A type string failed to parse, or a schema read from a header or a
    /// file trailer did not match the schema the caller expected.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A schema read back from a `RowBinaryWithNames(AndTypes)` header or a
    /// seekable file's trailer does not match the schema supplied by the
    /// caller.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A value could not be encoded as its declared type: out-of-range
    /// integers, a `FixedString` longer than its declared width, an enum
    /// label absent from its mapping, or a `Decimal` coefficient overflow.
    #[error("validation error for column {column}: {message}")]
    Validation { column: usize, message: String },

    /// The byte stream ended, or contained invalid data, partway through
    /// decoding a value.
    #[error("codec error at column {column}: {message} ({remaining} bytes remaining)")]
    Codec {
        column: usize,
        message: String,
        remaining: usize,
    },

    /// A Zstd frame failed to decompress: bad magic, checksum mismatch, or
    /// a truncated frame.
    #[error("zstd frame error at frame {frame_index}: {message}")]
    Frame { frame_index: usize, message: String },

    /// An operation was invoked out of order against a writer or reader's
    /// state machine (e.g. `write_header` called twice, or after the first
    /// row; any write after `finish`).
    #[error("invalid state: {0}")]
    State(String),

    /// A cursor motion (`seek`, `seek_relative`) targeted a row index
    /// outside `[0, total_rows]`.
    #[error("cursor out of bounds: index {index} exceeds total_rows {total_rows}")]
    Bounds { index: i64, total_rows: u64 },

    /// The seekable container's footer or trailer was absent, truncated, or
    /// did not carry the expected magic/version.
    #[error("container format error: {0}")]
    Format(String),

    /// Any I/O failure from the underlying file handle.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from a boxed, unnamed source kept for diagnostics.
    #[error("{0}")]
    Other(BoxedError),
}

impl Error {
    pub(crate) fn validation(column: usize, message: impl fmt::Display) -> Self {
        Error::Validation { column, message: message.to_string() }
    }

    pub(crate) fn codec(column: usize, message: impl fmt::Display, remaining: usize) -> Self {
        Error::Codec { column, message: message.to_string(), remaining }
    }

    pub(crate) fn frame(frame_index: usize, message: impl fmt::Display) -> Self {
        Error::Frame { frame_index, message: message.to_string() }
    }

    pub(crate) fn state(message: impl fmt::Display) -> Self {
        Error::State(message.to_string())
    }

    pub(crate) fn bounds(index: i64, total_rows: u64) -> Self {
        Error::Bounds { index, total_rows }
    }

    pub(crate) fn format(message: impl fmt::Display) -> Self {
        Error::Format(message.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        if let Error::Io(io_error) = error {
            io_error
        } else {
            io::Error::other(error)
        }
    }
}
