//! Seekable reader (C8, read half): random-access row lookup over a file
//! written by [`super::writer::SeekableWriter`], backed by a trailer-derived
//! frame index and a single decompressed-frame cache.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use rowbinary_types::Schema;
use tracing::{debug, trace};

use super::frame::ZSTD_MAGIC;
use super::trailer::{FrameEntry, Footer, Trailer, FOOTER_LEN};
use crate::codec::decode_value;
use crate::error::Error;
use crate::row::{row_byte_length, Format, ReadRow};
use crate::value::Value;

struct FrameCache {
    frame_index: usize,
    data: Vec<u8>,
    /// `row_starts[i]` is the byte offset of row `i` within `data`;
    /// `row_starts[rows_in_frame]` is `data.len()`.
    row_starts: Vec<usize>,
}

/// Random-access reader over a seekable container file.
///
/// The trailer's schema is definitive: a caller who opens without supplying
/// one inherits it, and a caller who supplies one gets a hard
/// [`Error::SchemaMismatch`] if it disagrees. The wire format does not
/// persist which [`Format`] a file's optional frame-0 header was written
/// with, so `open` takes it as a parameter matching whatever
/// `SeekableWriter` was constructed with.
pub struct SeekableReader {
    file: File,
    schema: Schema,
    frames: Vec<FrameEntry>,
    cumulative_rows: Vec<u64>,
    trailer_offset: u64,
    total_rows: u64,
    header_len: usize,
    current_index: u64,
    cache: Option<FrameCache>,
}

impl SeekableReader {
    pub fn open(path: impl AsRef<Path>, schema: Option<Schema>, format: Format) -> Result<Self, Error> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < FOOTER_LEN as u64 {
            return Err(Error::format("file is smaller than a footer, not a seekable container"));
        }

        file.seek(SeekFrom::End(-(FOOTER_LEN as i64)))?;
        let mut footer_bytes = [0u8; FOOTER_LEN];
        file.read_exact(&mut footer_bytes)?;
        let footer = Footer::decode(&footer_bytes)?;

        file.seek(SeekFrom::Start(footer.trailer_offset))?;
        let mut trailer_bytes = vec![0u8; footer.trailer_length as usize];
        file.read_exact(&mut trailer_bytes)?;
        let trailer = Trailer::decode(&mut trailer_bytes.as_slice())?;

        let total_rows = trailer.total_rows();
        if total_rows != footer.total_rows {
            return Err(Error::format(format!(
                "trailer counts {total_rows} rows but footer says {}",
                footer.total_rows
            )));
        }

        let schema = match schema {
            Some(supplied) if supplied == trailer.schema => supplied,
            Some(_) => {
                return Err(Error::SchemaMismatch(
                    "supplied schema does not match the file's trailer schema".to_string(),
                ));
            }
            None => trailer.schema,
        };

        let header_len = match format {
            Format::RowBinary => 0,
            Format::RowBinaryWithNames => {
                let mut buf = Vec::new();
                schema.write_names_header(&mut buf);
                buf.len()
            }
            Format::RowBinaryWithNamesAndTypes => {
                let mut buf = Vec::new();
                schema.write_header(&mut buf);
                buf.len()
            }
        };

        let mut cumulative_rows = Vec::with_capacity(trailer.frames.len() + 1);
        cumulative_rows.push(0u64);
        let mut running = 0u64;
        for frame in &trailer.frames {
            running += frame.rows_in_frame as u64;
            cumulative_rows.push(running);
        }

        debug!(total_rows, frame_count = trailer.frames.len(), "opened seekable container");

        Ok(SeekableReader {
            file,
            schema,
            frames: trailer.frames,
            cumulative_rows,
            trailer_offset: footer.trailer_offset,
            total_rows,
            header_len,
            current_index: 0,
            cache: None,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn current_index(&self) -> u64 {
        self.current_index
    }

    pub fn seek(&mut self, index: u64) -> Result<(), Error> {
        if index > self.total_rows {
            return Err(Error::bounds(index as i64, self.total_rows));
        }
        self.current_index = index;
        Ok(())
    }

    pub fn seek_relative(&mut self, delta: i64) -> Result<(), Error> {
        let target = self.current_index as i64 + delta;
        if target < 0 {
            return Err(Error::bounds(target, self.total_rows));
        }
        self.seek(target as u64)
    }

    pub fn seek_to_start(&mut self) {
        self.current_index = 0;
    }

    /// The raw encoded bytes of the row at the cursor, with no decoding and
    /// no cursor motion.
    pub fn current_row_bytes(&mut self) -> Result<&[u8], Error> {
        if self.current_index >= self.total_rows {
            return Err(Error::bounds(self.current_index as i64, self.total_rows));
        }
        let (frame_index, intra) = self.locate(self.current_index);
        self.ensure_frame_loaded(frame_index)?;
        let cache = self.cache.as_ref().expect("just loaded");
        Ok(&cache.data[cache.row_starts[intra]..cache.row_starts[intra + 1]])
    }

    /// Decodes the row at the cursor. `advance` controls whether the cursor
    /// moves past it. Returns [`ReadRow::EndOfStream`] once `current_index`
    /// reaches `total_rows`, without error.
    pub fn read_current(&mut self, advance: bool) -> Result<ReadRow, Error> {
        if self.current_index >= self.total_rows {
            return Ok(ReadRow::EndOfStream);
        }
        let (frame_index, intra) = self.locate(self.current_index);
        self.ensure_frame_loaded(frame_index)?;
        let cache = self.cache.as_ref().expect("just loaded");
        let mut slice = &cache.data[cache.row_starts[intra]..cache.row_starts[intra + 1]];
        let mut values = Vec::with_capacity(self.schema.len());
        for (i, column) in self.schema.columns().iter().enumerate() {
            values.push(decode_value(&mut slice, &column.data_type, i)?);
        }
        if advance {
            self.current_index += 1;
        }
        Ok(ReadRow::Row(values))
    }

    pub fn read_rows(&mut self, n: u64) -> Result<Vec<Vec<Value>>, Error> {
        let mut rows = Vec::new();
        for _ in 0..n {
            match self.read_current(true)? {
                ReadRow::Row(row) => rows.push(row),
                ReadRow::EndOfStream => break,
            }
        }
        Ok(rows)
    }

    fn locate(&self, index: u64) -> (usize, usize) {
        let frame_index = self.cumulative_rows.partition_point(|&c| c <= index) - 1;
        let intra = (index - self.cumulative_rows[frame_index]) as usize;
        (frame_index, intra)
    }

    fn ensure_frame_loaded(&mut self, frame_index: usize) -> Result<(), Error> {
        if let Some(cache) = &self.cache {
            if cache.frame_index == frame_index {
                return Ok(());
            }
        }

        trace!(
            frame_index,
            previous = self.cache.as_ref().map(|c| c.frame_index),
            "frame cache miss, reloading"
        );

        let entry = self.frames[frame_index];
        let next_offset =
            self.frames.get(frame_index + 1).map(|f| f.file_offset).unwrap_or(self.trailer_offset);
        let compressed_len = (next_offset - entry.file_offset) as usize;

        self.file.seek(SeekFrom::Start(entry.file_offset))?;
        let mut compressed = vec![0u8; compressed_len];
        self.file.read_exact(&mut compressed)?;
        if !compressed.starts_with(&ZSTD_MAGIC) {
            return Err(Error::frame(frame_index, "frame does not start with a Zstd magic number"));
        }
        let data = zstd::decode_all(compressed.as_slice()).map_err(|e| Error::frame(frame_index, e))?;

        let skip_prefix = if frame_index == 0 { self.header_len } else { 0 };
        let row_starts = compute_row_starts(&data, &self.schema, entry.rows_in_frame, skip_prefix)?;
        self.cache = Some(FrameCache { frame_index, data, row_starts });
        Ok(())
    }
}

impl Iterator for SeekableReader {
    type Item = Result<Vec<Value>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_current(true) {
            Ok(ReadRow::Row(row)) => Some(Ok(row)),
            Ok(ReadRow::EndOfStream) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn compute_row_starts(
    data: &[u8],
    schema: &Schema,
    rows_in_frame: u32,
    skip_prefix: usize,
) -> Result<Vec<usize>, Error> {
    let mut row_starts = Vec::with_capacity(rows_in_frame as usize + 1);
    let mut offset = skip_prefix;
    row_starts.push(offset);
    for _ in 0..rows_in_frame {
        let consumed = row_byte_length(&data[offset..], schema)?;
        offset += consumed;
        row_starts.push(offset);
    }
    Ok(row_starts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::frame::FrameLayerOptions;
    use crate::container::writer::SeekableWriter;
    use crate::row::Row;
    use rowbinary_types::{Column, DataType};
    use tempfile::NamedTempFile;

    fn sample_schema() -> Schema {
        Schema::new(vec![Column::new("id", DataType::UInt32), Column::new("name", DataType::String)]).unwrap()
    }

    fn write_sample(path: &Path, rows: u32, options: FrameLayerOptions) {
        let mut writer = SeekableWriter::create(path, sample_schema(), Format::RowBinary, options).unwrap();
        for i in 0..rows {
            writer.write_row(&Row::Ordered(vec![Value::UInt32(i), Value::from(format!("row-{i}"))])).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn reads_rows_back_in_order() {
        let file = NamedTempFile::new().unwrap();
        write_sample(file.path(), 5, Default::default());

        let mut reader = SeekableReader::open(file.path(), Some(sample_schema()), Format::RowBinary).unwrap();
        assert_eq!(reader.total_rows(), 5);
        for i in 0..5u32 {
            match reader.read_current(true).unwrap() {
                ReadRow::Row(row) => assert_eq!(row, vec![Value::UInt32(i), Value::from(format!("row-{i}"))]),
                ReadRow::EndOfStream => panic!("expected a row"),
            }
        }
        assert!(matches!(reader.read_current(true).unwrap(), ReadRow::EndOfStream));
    }

    #[test]
    fn seek_jumps_across_many_frames() {
        let file = NamedTempFile::new().unwrap();
        let options = FrameLayerOptions { max_rows_per_frame: 100, ..Default::default() };
        write_sample(file.path(), 10_000, options);

        let mut reader = SeekableReader::open(file.path(), None, Format::RowBinary).unwrap();
        reader.seek(5_000).unwrap();
        match reader.read_current(true).unwrap() {
            ReadRow::Row(row) => assert_eq!(row[0], Value::UInt32(5_000)),
            ReadRow::EndOfStream => panic!("expected a row"),
        }

        reader.seek(9_999).unwrap();
        match reader.read_current(true).unwrap() {
            ReadRow::Row(row) => assert_eq!(row[0], Value::UInt32(9_999)),
            ReadRow::EndOfStream => panic!("expected a row"),
        }
        assert!(matches!(reader.read_current(true).unwrap(), ReadRow::EndOfStream));
    }

    #[test]
    fn seek_past_total_rows_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        write_sample(file.path(), 3, Default::default());
        let mut reader = SeekableReader::open(file.path(), None, Format::RowBinary).unwrap();
        assert!(matches!(reader.seek(4), Err(Error::Bounds { .. })));
        reader.seek(3).unwrap(); // exactly total_rows is valid: the end-of-stream position
    }

    #[test]
    fn schema_mismatch_against_trailer_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        write_sample(file.path(), 1, Default::default());
        let wrong = Schema::new(vec![Column::new("id", DataType::UInt64)]).unwrap();
        let result = SeekableReader::open(file.path(), Some(wrong), Format::RowBinary);
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn current_row_bytes_does_not_advance_cursor() {
        let file = NamedTempFile::new().unwrap();
        write_sample(file.path(), 2, Default::default());
        let mut reader = SeekableReader::open(file.path(), None, Format::RowBinary).unwrap();
        let bytes = reader.current_row_bytes().unwrap().to_vec();
        assert_eq!(reader.current_index(), 0);
        match reader.read_current(true).unwrap() {
            ReadRow::Row(row) => assert_eq!(row[0], Value::UInt32(0)),
            ReadRow::EndOfStream => panic!("expected a row"),
        }
        assert!(!bytes.is_empty());
    }
}
