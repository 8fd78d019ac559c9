use rowbinary::{Column, DataType, Format, Row, RowBinaryReader, RowBinaryWriter, Schema, Value};

fn schema() -> Schema {
    Schema::new(vec![
        Column::new("id", DataType::UInt32),
        Column::new("name", DataType::String),
        Column::new("tags", DataType::Array(Box::new(DataType::String))),
    ])
    .unwrap()
}

fn row(id: u32, name: &str, tags: &[&str]) -> Row {
    Row::Ordered(vec![
        Value::UInt32(id),
        Value::from(name),
        Value::Array(tags.iter().map(|t| Value::from(*t)).collect()),
    ])
}

#[test]
fn names_and_types_header_round_trips_through_an_independent_reader() {
    let mut writer = RowBinaryWriter::new(schema(), Format::RowBinaryWithNamesAndTypes);
    writer.write_header().unwrap();
    writer.write_row(&row(1, "alpha", &["a", "b"])).unwrap();
    writer.write_row(&row(2, "beta", &[])).unwrap();
    let bytes = writer.finish();

    let mut reader = RowBinaryReader::new(&bytes, schema(), Format::RowBinaryWithNamesAndTypes).unwrap();
    let rows = reader.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], Value::from("alpha"));
    assert_eq!(rows[1][2], Value::Array(vec![]));
    assert!(reader.is_at_end());
}

#[test]
fn named_row_missing_a_column_is_rejected_before_any_bytes_are_written() {
    let mut writer = RowBinaryWriter::new(schema(), Format::RowBinary);
    let incomplete = Row::Named(vec![("id".to_string(), Value::UInt32(1)), ("name".to_string(), Value::from("x"))]);
    assert!(writer.write_row(&incomplete).is_err());
    assert_eq!(writer.rows_written(), 0);
}

#[test]
fn nullable_column_tag_gates_whether_the_payload_is_present() {
    let nullable_schema =
        Schema::new(vec![Column::new("maybe", DataType::Nullable(Box::new(DataType::UInt32)))]).unwrap();

    let mut writer = RowBinaryWriter::new(nullable_schema.clone(), Format::RowBinary);
    writer.write_row(&Row::Ordered(vec![Value::Null])).unwrap();
    writer.write_row(&Row::Ordered(vec![Value::UInt32(42)])).unwrap();
    let bytes = writer.finish();
    assert_eq!(bytes, [1, 0, 4, 42, 0, 0, 0]);

    let mut reader = RowBinaryReader::new(&bytes, nullable_schema, Format::RowBinary).unwrap();
    let rows = reader.read_all().unwrap();
    assert_eq!(rows, vec![vec![Value::Null], vec![Value::UInt32(42)]]);
}
