//! Column and schema model, plus `RowBinaryWithNamesAndTypes` header codec.

use std::collections::HashMap;

use bytes::{Buf, BufMut};

use crate::error::SchemaError;
use crate::leb128::{put_leb128, read_leb128};
use crate::types::DataType;

/// A single named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column { name: name.into(), data_type }
    }
}

/// An ordered, named set of columns describing one row shape.
///
/// Column order is the row's wire order: values are always encoded and
/// decoded in schema order, never by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    index_by_name: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema from columns, rejecting empty schemas, empty names,
    /// and duplicate names.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::EmptyColumns);
        }
        let mut index_by_name = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if col.name.is_empty() {
                return Err(SchemaError::EmptyColumnName);
            }
            if index_by_name.insert(col.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Schema { columns, index_by_name })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Encodes the `RowBinaryWithNamesAndTypes` header: a LEB128 column
    /// count, then every column name, then every column's canonical type
    /// string, each as a LEB128-length-prefixed UTF-8 string.
    pub fn write_header(&self, buffer: &mut impl BufMut) {
        put_leb128(&mut *buffer, self.columns.len() as u64);
        for col in &self.columns {
            write_string(buffer, &col.name);
        }
        for col in &self.columns {
            write_string(buffer, &col.data_type.to_string());
        }
    }

    /// Decodes a `RowBinaryWithNamesAndTypes` header and builds the schema
    /// it describes.
    pub fn read_header(buffer: &mut &[u8]) -> Result<Self, SchemaError> {
        let count = read_leb128(buffer)? as usize;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(read_string(buffer)?);
        }
        let mut columns = Vec::with_capacity(count);
        for name in names {
            let type_str = read_string(buffer)?;
            let data_type = DataType::parse(&type_str)?;
            columns.push(Column::new(name, data_type));
        }
        Schema::new(columns)
    }

    /// Encodes just the column names, for `RowBinaryWithNames`.
    pub fn write_names_header(&self, buffer: &mut impl BufMut) {
        put_leb128(&mut *buffer, self.columns.len() as u64);
        for col in &self.columns {
            write_string(buffer, &col.name);
        }
    }

    /// Decodes a `RowBinaryWithNames` header's name list, checking it
    /// against an out-of-band schema rather than building one (there are
    /// no types on the wire for this format).
    pub fn read_names_header(buffer: &mut &[u8]) -> Result<Vec<String>, SchemaError> {
        let count = read_leb128(buffer)? as usize;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(read_string(buffer)?);
        }
        Ok(names)
    }
}

fn write_string(buffer: &mut impl BufMut, s: &str) {
    put_leb128(&mut *buffer, s.len() as u64);
    buffer.put_slice(s.as_bytes());
}

fn read_string(buffer: &mut &[u8]) -> Result<String, SchemaError> {
    let len = read_leb128(buffer)? as usize;
    if buffer.remaining() < len {
        return Err(SchemaError::NotEnoughData(format!(
            "string of length {len}, {} bytes remaining",
            buffer.remaining()
        )));
    }
    let bytes = buffer.copy_to_bytes(len);
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", DataType::UInt64),
            Column::new("name", DataType::String),
            Column::new("tags", DataType::Array(Box::new(DataType::String))),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_empty_schema() {
        assert!(matches!(Schema::new(vec![]), Err(SchemaError::EmptyColumns)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = Schema::new(vec![
            Column::new("id", DataType::UInt64),
            Column::new("id", DataType::String),
        ]);
        assert!(matches!(result, Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn rejects_empty_column_name() {
        let result = Schema::new(vec![Column::new("", DataType::UInt64)]);
        assert!(matches!(result, Err(SchemaError::EmptyColumnName)));
    }

    #[test]
    fn looks_up_columns_by_name() {
        let schema = sample_schema();
        assert_eq!(schema.index_of("name"), Some(1));
        assert_eq!(schema.index_of("missing"), None);
    }

    #[test]
    fn header_round_trips() {
        let schema = sample_schema();
        let mut buf = Vec::new();
        schema.write_header(&mut buf);
        let decoded = Schema::read_header(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn names_header_round_trips() {
        let schema = sample_schema();
        let mut buf = Vec::new();
        schema.write_names_header(&mut buf);
        let names = Schema::read_names_header(&mut buf.as_slice()).unwrap();
        assert_eq!(names, vec!["id", "name", "tags"]);
    }
}
