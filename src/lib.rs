//! RowBinary: ClickHouse's native row wire format, plus a seekable,
//! Zstd-framed container for random-access storage of encoded rows.
//!
//! The streaming half ([`Format`], [`Row`], [`RowBinaryWriter`],
//! [`RowBinaryReader`]) encodes and decodes one schema-shaped row at a time,
//! matching any of the three RowBinary header conventions ClickHouse uses on
//! the wire. The container half ([`SeekableWriter`], [`SeekableReader`])
//! batches rows into independently decompressible Zstd frames and appends a
//! trailer describing every frame's position and the schema the file was
//! written with, so a reader can jump to an arbitrary row without decoding
//! the rows before it.

mod codec;
mod container;
mod decimal;
pub mod error;
mod int256;
mod row;
mod uuid;
mod value;

pub use container::{FrameLayerOptions, SeekableReader, SeekableWriter};
pub use decimal::DecimalValue;
pub use error::{Error, Result};
pub use int256::{Int256, TryFromInt256Error, TryFromUInt256Error, UInt256};
pub use row::{row_byte_length, Format, ReadRow, Row, RowBinaryReader, RowBinaryWriter};
pub use value::Value;

pub use rowbinary_types::{Column, DataType, DecimalWidth, EnumKind, Schema, SchemaError};
