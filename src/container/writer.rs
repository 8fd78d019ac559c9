//! Seekable writer (C8, write half): append-only, frame-batched, Zstd-
//! compressed row output with a trailer/footer row index.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rowbinary_types::Schema;
use tracing::debug;

use super::frame::FrameLayerOptions;
use super::trailer::{FrameEntry, Footer, Trailer, FORMAT_VERSION};
use crate::codec::encode_value;
use crate::error::Error;
use crate::row::{Format, Row};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Fresh,
    HeaderWritten,
    Appending,
    Finalized,
}

/// Writes rows into a new seekable container file.
///
/// Construct with [`SeekableWriter::create`], optionally call
/// [`SeekableWriter::write_header`], append rows, then consume with
/// [`SeekableWriter::finish`] to commit the trailer and footer. Dropping the
/// writer without calling `finish` leaves the file without a footer, which
/// makes it unopenable — this is the documented way to distinguish a
/// committed write from an aborted one.
pub struct SeekableWriter {
    file: File,
    schema: Schema,
    format: Format,
    options: FrameLayerOptions,
    state: WriterState,
    current_frame: Vec<u8>,
    current_frame_rows: u32,
    frames: Vec<FrameEntry>,
    file_offset: u64,
    rows_written: u64,
}

impl SeekableWriter {
    pub fn create(
        path: impl AsRef<Path>,
        schema: Schema,
        format: Format,
        options: FrameLayerOptions,
    ) -> Result<Self, Error> {
        let file = File::create(path)?;
        let state = if format == Format::RowBinary { WriterState::Appending } else { WriterState::Fresh };
        Ok(SeekableWriter {
            file,
            schema,
            format,
            options,
            state,
            current_frame: Vec::new(),
            current_frame_rows: 0,
            frames: Vec::new(),
            file_offset: 0,
            rows_written: 0,
        })
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Writes the header (if the format carries one) into the uncompressed
    /// payload of what will become the first frame. Valid only once, before
    /// any row.
    pub fn write_header(&mut self) -> Result<(), Error> {
        if self.format == Format::RowBinary {
            return Err(Error::state("RowBinary has no header to write"));
        }
        if self.state != WriterState::Fresh {
            return Err(Error::state("write_header must be the first operation"));
        }
        match self.format {
            Format::RowBinaryWithNames => self.schema.write_names_header(&mut self.current_frame),
            Format::RowBinaryWithNamesAndTypes => self.schema.write_header(&mut self.current_frame),
            Format::RowBinary => unreachable!("checked above"),
        }
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    fn ensure_appendable(&mut self) -> Result<(), Error> {
        match self.state {
            WriterState::Fresh if self.format == Format::RowBinary => {
                self.state = WriterState::Appending;
                Ok(())
            }
            WriterState::Fresh => Err(Error::state("write_header must be called before the first row")),
            WriterState::HeaderWritten => {
                self.state = WriterState::Appending;
                Ok(())
            }
            WriterState::Appending => Ok(()),
            WriterState::Finalized => Err(Error::state("writer already finalized")),
        }
    }

    /// Encodes and appends one row, flushing the current frame if either
    /// threshold in [`FrameLayerOptions`] has been reached.
    pub fn write_row(&mut self, row: &Row) -> Result<(), Error> {
        self.ensure_appendable()?;
        let resolved = row.resolve(&self.schema)?;
        let mut encoded = Vec::new();
        for (i, (value, column)) in resolved.iter().zip(self.schema.columns()).enumerate() {
            encode_value(&mut encoded, &column.data_type, value, i)?;
        }
        self.current_frame.extend_from_slice(&encoded);
        self.current_frame_rows += 1;
        self.rows_written += 1;
        self.maybe_flush()?;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[Row]) -> Result<(), Error> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Appends pre-encoded raw row bytes without decoding them. The caller
    /// is responsible for their correctness; they still count toward
    /// `rows_written` and frame flush thresholds.
    pub fn write_row_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.ensure_appendable()?;
        self.current_frame.extend_from_slice(bytes);
        self.current_frame_rows += 1;
        self.rows_written += 1;
        self.maybe_flush()?;
        Ok(())
    }

    fn maybe_flush(&mut self) -> Result<(), Error> {
        if self.options.should_flush(self.current_frame_rows, self.current_frame.len()) {
            self.flush_frame()?;
        }
        Ok(())
    }

    fn flush_frame(&mut self) -> Result<(), Error> {
        if self.current_frame.is_empty() {
            return Ok(());
        }
        let compressed = zstd::encode_all(self.current_frame.as_slice(), self.options.zstd_level)
            .map_err(|e| Error::frame(self.frames.len(), e))?;
        self.file.write_all(&compressed)?;
        debug!(
            frame_index = self.frames.len(),
            uncompressed_bytes = self.current_frame.len(),
            compressed_bytes = compressed.len(),
            rows = self.current_frame_rows,
            "flushed frame"
        );
        self.frames.push(FrameEntry {
            file_offset: self.file_offset,
            uncompressed_size: self.current_frame.len() as u64,
            rows_in_frame: self.current_frame_rows,
        });
        self.file_offset += compressed.len() as u64;
        self.current_frame.clear();
        self.current_frame_rows = 0;
        Ok(())
    }

    /// Flushes any partial frame, writes the trailer and footer, fsyncs,
    /// and closes the file. This is the only path that makes the file
    /// openable by [`super::reader::SeekableReader`].
    pub fn finish(mut self) -> Result<(), Error> {
        self.flush_frame()?;

        let trailer = Trailer { frames: self.frames.clone(), schema: self.schema.clone() };
        let mut trailer_bytes = Vec::new();
        trailer.encode(&mut trailer_bytes);
        self.file.write_all(&trailer_bytes)?;

        let footer = Footer {
            trailer_offset: self.file_offset,
            trailer_length: trailer_bytes.len() as u64,
            total_rows: self.rows_written,
            format_version: FORMAT_VERSION,
        };
        self.file.write_all(&footer.encode())?;
        self.file.sync_all()?;
        self.state = WriterState::Finalized;

        debug!(total_rows = self.rows_written, frames = trailer.frames.len(), "finalized seekable writer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbinary_types::{Column, DataType};
    use tempfile::NamedTempFile;

    fn sample_schema() -> Schema {
        Schema::new(vec![Column::new("id", DataType::UInt32)]).unwrap()
    }

    #[test]
    fn write_after_finish_is_unreachable_by_construction() {
        // `finish` consumes `self`, so a use-after-finish is a compile error
        // rather than a runtime `StateError` — documented here as the
        // Rust-idiomatic equivalent of the state machine's `Finalized` gate.
        let file = NamedTempFile::new().unwrap();
        let writer = SeekableWriter::create(file.path(), sample_schema(), Format::RowBinary, Default::default())
            .unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn header_required_for_named_formats() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = SeekableWriter::create(
            file.path(),
            sample_schema(),
            Format::RowBinaryWithNames,
            Default::default(),
        )
        .unwrap();
        let row = Row::Ordered(vec![Value::UInt32(1)]);
        assert!(writer.write_row(&row).is_err());
    }

    #[test]
    fn dropping_without_finish_leaves_no_footer() {
        let file = NamedTempFile::new().unwrap();
        {
            let mut writer =
                SeekableWriter::create(file.path(), sample_schema(), Format::RowBinary, Default::default()).unwrap();
            writer.write_row(&Row::Ordered(vec![Value::UInt32(1)])).unwrap();
            // dropped here without calling finish()
        }
        let bytes = std::fs::read(file.path()).unwrap();
        assert!(bytes.len() < super::super::trailer::FOOTER_LEN || Footer::decode(
            &bytes[bytes.len().saturating_sub(super::super::trailer::FOOTER_LEN)..]
        ).is_err());
    }
}
