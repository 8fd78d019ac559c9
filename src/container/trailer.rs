//! Row index (C7): the trailer and fixed footer appended after the last
//! frame of a seekable container, in the exact byte layout the wire format
//! specifies.

use bytes::{Buf, BufMut};
use rowbinary_types::{leb128, Column, Schema};

use crate::error::Error;

pub(crate) const MAGIC: [u8; 4] = *b"CHRB";
pub(crate) const FORMAT_VERSION: u32 = 1;
pub(crate) const FOOTER_LEN: usize = 8 + 8 + 8 + 4 + 4;

/// One frame's position and size, as recorded in the trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameEntry {
    pub file_offset: u64,
    pub uncompressed_size: u64,
    pub rows_in_frame: u32,
}

/// The row index: every frame's position plus the schema the file was
/// written with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Trailer {
    pub frames: Vec<FrameEntry>,
    pub schema: Schema,
}

impl Trailer {
    pub(crate) fn total_rows(&self) -> u64 {
        self.frames.iter().map(|f| f.rows_in_frame as u64).sum()
    }

    pub(crate) fn encode(&self, buffer: &mut impl BufMut) {
        leb128::put_leb128(&mut *buffer, self.frames.len() as u64);
        for frame in &self.frames {
            buffer.put_u64_le(frame.file_offset);
            buffer.put_u64_le(frame.uncompressed_size);
            buffer.put_u32_le(frame.rows_in_frame);
        }
        leb128::put_leb128(&mut *buffer, self.schema.len() as u64);
        for column in self.schema.columns() {
            write_string(buffer, &column.name);
            write_string(buffer, &column.data_type.to_string());
        }
    }

    pub(crate) fn decode(buffer: &mut &[u8]) -> Result<Self, Error> {
        let frame_count = leb128::read_leb128(buffer).map_err(Error::Schema)? as usize;
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            need(buffer, 20)?;
            frames.push(FrameEntry {
                file_offset: buffer.get_u64_le(),
                uncompressed_size: buffer.get_u64_le(),
                rows_in_frame: buffer.get_u32_le(),
            });
        }
        let column_count = leb128::read_leb128(buffer).map_err(Error::Schema)? as usize;
        let mut columns = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let name = read_string(buffer)?;
            let type_str = read_string(buffer)?;
            let data_type = rowbinary_types::DataType::parse(&type_str).map_err(Error::Schema)?;
            columns.push(Column::new(name, data_type));
        }
        let schema = Schema::new(columns).map_err(Error::Schema)?;
        Ok(Trailer { frames, schema })
    }
}

/// The fixed 32-byte tail of a seekable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Footer {
    pub trailer_offset: u64,
    pub trailer_length: u64,
    pub total_rows: u64,
    pub format_version: u32,
}

impl Footer {
    pub(crate) fn encode(&self) -> [u8; FOOTER_LEN] {
        let mut buffer = Vec::with_capacity(FOOTER_LEN);
        buffer.put_u64_le(self.trailer_offset);
        buffer.put_u64_le(self.trailer_length);
        buffer.put_u64_le(self.total_rows);
        buffer.put_u32_le(self.format_version);
        buffer.put_slice(&MAGIC);
        buffer.try_into().expect("footer is always exactly FOOTER_LEN bytes")
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != FOOTER_LEN {
            return Err(Error::format(format!("footer must be {FOOTER_LEN} bytes, got {}", bytes.len())));
        }
        let mut buffer = bytes;
        let trailer_offset = buffer.get_u64_le();
        let trailer_length = buffer.get_u64_le();
        let total_rows = buffer.get_u64_le();
        let format_version = buffer.get_u32_le();
        let mut magic = [0u8; 4];
        buffer.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(Error::format("bad footer magic, not a CHRB seekable file"));
        }
        if format_version != FORMAT_VERSION {
            return Err(Error::format(format!("unsupported format version {format_version}")));
        }
        Ok(Footer { trailer_offset, trailer_length, total_rows, format_version })
    }
}

fn write_string(buffer: &mut impl BufMut, s: &str) {
    leb128::put_leb128(&mut *buffer, s.len() as u64);
    buffer.put_slice(s.as_bytes());
}

fn read_string(buffer: &mut &[u8]) -> Result<String, Error> {
    let len = leb128::read_leb128(buffer).map_err(Error::Schema)? as usize;
    need(buffer, len)?;
    let bytes = buffer.copy_to_bytes(len);
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn need(buffer: &[u8], n: usize) -> Result<(), Error> {
    if buffer.remaining() < n {
        Err(Error::format(format!("trailer truncated: needed {n} bytes, had {}", buffer.remaining())))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbinary_types::DataType;

    fn sample_schema() -> Schema {
        Schema::new(vec![Column::new("id", DataType::UInt32), Column::new("name", DataType::String)]).unwrap()
    }

    #[test]
    fn trailer_round_trips() {
        let trailer = Trailer {
            frames: vec![
                FrameEntry { file_offset: 0, uncompressed_size: 100, rows_in_frame: 10 },
                FrameEntry { file_offset: 50, uncompressed_size: 200, rows_in_frame: 20 },
            ],
            schema: sample_schema(),
        };
        let mut buf = Vec::new();
        trailer.encode(&mut buf);
        let decoded = Trailer::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, trailer);
        assert_eq!(decoded.total_rows(), 30);
    }

    #[test]
    fn footer_round_trips_and_is_fixed_size() {
        let footer = Footer { trailer_offset: 123, trailer_length: 45, total_rows: 6789, format_version: 1 };
        let bytes = footer.encode();
        assert_eq!(bytes.len(), FOOTER_LEN);
        let decoded = Footer::decode(&bytes).unwrap();
        assert_eq!(decoded, footer);
    }

    #[test]
    fn footer_rejects_bad_magic() {
        let mut bytes = Footer { trailer_offset: 0, trailer_length: 0, total_rows: 0, format_version: 1 }.encode();
        bytes[28] = b'X';
        assert!(Footer::decode(&bytes).is_err());
    }

    #[test]
    fn footer_rejects_wrong_length() {
        assert!(Footer::decode(&[0u8; 10]).is_err());
    }
}
