//! Row streamer (C5): row-level encode/decode and the three header variants.

use rowbinary_types::Schema;

use crate::codec::{decode_value, encode_value, skip_value};
use crate::error::Error;
use crate::value::Value;

/// Which of the three RowBinary header conventions a stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Rows only, no header.
    RowBinary,
    /// A header of column names precedes the rows.
    RowBinaryWithNames,
    /// A header of column names and canonical type strings precedes the rows.
    RowBinaryWithNamesAndTypes,
}

impl Format {
    fn has_header(self) -> bool {
        !matches!(self, Format::RowBinary)
    }
}

/// One row of input to a writer: either in schema column order, or named,
/// in which case every schema column must be present (extras are rejected).
#[derive(Debug, Clone)]
pub enum Row {
    Ordered(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Row {
    pub(crate) fn resolve<'a>(&'a self, schema: &Schema) -> Result<Vec<&'a Value>, Error> {
        match self {
            Row::Ordered(values) => {
                if values.len() != schema.len() {
                    return Err(Error::validation(
                        0,
                        format!("row has {} values, schema declares {} columns", values.len(), schema.len()),
                    ));
                }
                Ok(values.iter().collect())
            }
            Row::Named(pairs) => {
                let mut resolved: Vec<Option<&'a Value>> = vec![None; schema.len()];
                for (name, value) in pairs {
                    let index = schema.index_of(name).ok_or_else(|| {
                        Error::validation(0, format!("column '{name}' is not part of the schema"))
                    })?;
                    if resolved[index].is_some() {
                        return Err(Error::validation(0, format!("duplicate value for column '{name}'")));
                    }
                    resolved[index] = Some(value);
                }
                resolved
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v.ok_or_else(|| {
                            Error::validation(i, format!("missing value for column '{}'", schema.column(i).unwrap().name))
                        })
                    })
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Fresh,
    HeaderWritten,
    Appending,
}

/// Encodes rows against a fixed schema into an in-memory buffer.
pub struct RowBinaryWriter {
    schema: Schema,
    format: Format,
    buffer: Vec<u8>,
    rows_written: u64,
    state: WriteState,
}

impl RowBinaryWriter {
    pub fn new(schema: Schema, format: Format) -> Self {
        let state = if format.has_header() { WriteState::Fresh } else { WriteState::Appending };
        RowBinaryWriter { schema, format, buffer: Vec::new(), rows_written: 0, state }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Writes the header. Valid only as the first operation, and only for
    /// formats that carry one.
    pub fn write_header(&mut self) -> Result<(), Error> {
        match self.format {
            Format::RowBinary => {
                return Err(Error::state("RowBinary has no header to write"));
            }
            Format::RowBinaryWithNames => {
                if self.state != WriteState::Fresh {
                    return Err(Error::state("write_header called after the first row, or twice"));
                }
                self.schema.write_names_header(&mut self.buffer);
            }
            Format::RowBinaryWithNamesAndTypes => {
                if self.state != WriteState::Fresh {
                    return Err(Error::state("write_header called after the first row, or twice"));
                }
                self.schema.write_header(&mut self.buffer);
            }
        }
        self.state = WriteState::HeaderWritten;
        Ok(())
    }

    /// Encodes and appends one row. If a header is required and has not yet
    /// been written, writing a row implicitly advances past it (matching the
    /// seekable writer's `HeaderWritten` state being a no-op waypoint, not a
    /// hard gate) only when the format has no header at all; formats with a
    /// header require an explicit `write_header()` first.
    pub fn write_row(&mut self, row: &Row) -> Result<(), Error> {
        if self.format.has_header() && self.state == WriteState::Fresh {
            return Err(Error::state("write_header must be called before the first row"));
        }
        let resolved = row.resolve(&self.schema)?;
        let mut row_buffer = Vec::new();
        for (i, (value, column)) in resolved.iter().zip(self.schema.columns()).enumerate() {
            encode_value(&mut row_buffer, &column.data_type, value, i)?;
        }
        self.buffer.extend_from_slice(&row_buffer);
        self.rows_written += 1;
        self.state = WriteState::Appending;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[Row]) -> Result<(), Error> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Returns the accumulated bytes, resetting the writer for reuse:
    /// `rows_written` goes back to 0 and a new header will be required
    /// again if the format carries one.
    pub fn take(&mut self) -> Vec<u8> {
        let bytes = std::mem::take(&mut self.buffer);
        self.rows_written = 0;
        self.state = if self.format.has_header() { WriteState::Fresh } else { WriteState::Appending };
        bytes
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.take()
    }
}

/// Decodes rows against a fixed schema from a borrowed byte region.
pub struct RowBinaryReader<'a> {
    schema: Schema,
    remaining: &'a [u8],
}

/// Sentinel returned by [`RowBinaryReader::read_row`] at end of stream.
pub enum ReadRow {
    Row(Vec<Value>),
    EndOfStream,
}

impl<'a> RowBinaryReader<'a> {
    /// Consumes the header (if the format has one) from `input` and
    /// validates it against `schema`.
    pub fn new(mut input: &'a [u8], schema: Schema, format: Format) -> Result<Self, Error> {
        match format {
            Format::RowBinary => {}
            Format::RowBinaryWithNames => {
                let names = Schema::read_names_header(&mut input).map_err(Error::Schema)?;
                let expected: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
                if names.iter().map(String::as_str).ne(expected.iter().copied()) {
                    return Err(Error::SchemaMismatch(format!(
                        "header names {names:?} do not match schema columns {expected:?}"
                    )));
                }
            }
            Format::RowBinaryWithNamesAndTypes => {
                let header_schema = Schema::read_header(&mut input).map_err(Error::Schema)?;
                if header_schema != schema {
                    return Err(Error::SchemaMismatch(
                        "header names/types do not match the supplied schema".to_string(),
                    ));
                }
            }
        }
        Ok(RowBinaryReader { schema, remaining: input })
    }

    /// Returns the next row, or [`ReadRow::EndOfStream`] once the cursor has
    /// consumed every complete row. A partial row at EOF is a hard error.
    pub fn read_row(&mut self) -> Result<ReadRow, Error> {
        if self.remaining.is_empty() {
            return Ok(ReadRow::EndOfStream);
        }
        let mut cursor = self.remaining;
        let mut values = Vec::with_capacity(self.schema.len());
        for (i, column) in self.schema.columns().iter().enumerate() {
            values.push(decode_value(&mut cursor, &column.data_type, i)?);
        }
        self.remaining = cursor;
        Ok(ReadRow::Row(values))
    }

    pub fn read_all(&mut self) -> Result<Vec<Vec<Value>>, Error> {
        let mut rows = Vec::new();
        loop {
            match self.read_row()? {
                ReadRow::Row(row) => rows.push(row),
                ReadRow::EndOfStream => break,
            }
        }
        Ok(rows)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// `true` once every complete row has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Computes the byte length of the row at the front of `input` using the
/// skip-only decoder, without materializing values. Used by the seekable
/// reader to build its intra-frame row-offset table.
pub fn row_byte_length(input: &[u8], schema: &Schema) -> Result<usize, Error> {
    let mut cursor = input;
    for (i, column) in schema.columns().iter().enumerate() {
        skip_value(&mut cursor, &column.data_type, i)?;
    }
    Ok(input.len() - cursor.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbinary_types::{Column, DataType};

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", DataType::UInt32),
            Column::new("name", DataType::String),
            Column::new("active", DataType::Bool),
        ])
        .unwrap()
    }

    #[test]
    fn scenario_1_matches_spec_bytes() {
        let schema = sample_schema();
        let mut writer = RowBinaryWriter::new(schema.clone(), Format::RowBinary);
        writer
            .write_row(&Row::Ordered(vec![Value::UInt32(1), Value::from("Alice"), Value::Bool(true)]))
            .unwrap();
        writer
            .write_row(&Row::Ordered(vec![Value::UInt32(2), Value::from("Bob"), Value::Bool(false)]))
            .unwrap();
        let bytes = writer.finish();
        let expected = [
            1u8, 0, 0, 0, 5, b'A', b'l', b'i', b'c', b'e', 1, 2, 0, 0, 0, 3, b'B', b'o', b'b', 0,
        ];
        assert_eq!(bytes, expected);

        let mut reader = RowBinaryReader::new(&bytes, schema, Format::RowBinary).unwrap();
        let rows = reader.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Value::UInt32(1), Value::from("Alice"), Value::Bool(true)]);
    }

    #[test]
    fn named_rows_require_every_column() {
        let schema = sample_schema();
        let mut writer = RowBinaryWriter::new(schema, Format::RowBinary);
        let row = Row::Named(vec![("id".to_string(), Value::UInt32(1)), ("name".to_string(), Value::from("x"))]);
        assert!(writer.write_row(&row).is_err());
    }

    #[test]
    fn header_required_before_first_row_for_named_formats() {
        let schema = sample_schema();
        let mut writer = RowBinaryWriter::new(schema, Format::RowBinaryWithNames);
        let row = Row::Ordered(vec![Value::UInt32(1), Value::from("x"), Value::Bool(true)]);
        assert!(writer.write_row(&row).is_err());
        writer.write_header().unwrap();
        writer.write_row(&row).unwrap();
        assert!(writer.write_header().is_err());
    }

    #[test]
    fn names_and_types_round_trip() {
        let schema = sample_schema();
        let mut writer = RowBinaryWriter::new(schema.clone(), Format::RowBinaryWithNamesAndTypes);
        writer.write_header().unwrap();
        writer
            .write_row(&Row::Ordered(vec![Value::UInt32(1), Value::from("Alice"), Value::Bool(true)]))
            .unwrap();
        let bytes = writer.finish();
        let mut reader = RowBinaryReader::new(&bytes, schema, Format::RowBinaryWithNamesAndTypes).unwrap();
        let rows = reader.read_all().unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn schema_mismatch_on_names_and_types_is_fatal() {
        let schema = sample_schema();
        let mut writer = RowBinaryWriter::new(schema, Format::RowBinaryWithNamesAndTypes);
        writer.write_header().unwrap();
        let bytes = writer.finish();

        let wrong_schema = Schema::new(vec![Column::new("id", DataType::UInt64)]).unwrap();
        let result = RowBinaryReader::new(&bytes, wrong_schema, Format::RowBinaryWithNamesAndTypes);
        assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn partial_row_at_eof_errors() {
        let schema = sample_schema();
        let bytes = [1u8, 0, 0, 0]; // just the UInt32, nothing else
        let mut reader = RowBinaryReader::new(&bytes, schema, Format::RowBinary).unwrap();
        assert!(reader.read_row().is_err());
    }

    #[test]
    fn row_byte_length_matches_encoded_size() {
        let schema = sample_schema();
        let mut writer = RowBinaryWriter::new(schema.clone(), Format::RowBinary);
        writer
            .write_row(&Row::Ordered(vec![Value::UInt32(7), Value::from("hey"), Value::Bool(false)]))
            .unwrap();
        let bytes = writer.finish();
        assert_eq!(row_byte_length(&bytes, &schema).unwrap(), bytes.len());
    }
}
