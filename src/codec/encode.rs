//! Type codec dispatch, encode direction (C4).

use bytes::BufMut;
use rowbinary_types::DataType;

use super::primitive::{write_string_bytes, write_varint};
use crate::error::Error;
use crate::value::Value;

/// Encodes `value` as `ty` into `buffer`, appending nothing on error.
pub(crate) fn encode_value(buffer: &mut Vec<u8>, ty: &DataType, value: &Value, column: usize) -> Result<(), Error> {
    // Encode into a scratch buffer first so a mid-value failure never
    // leaves a partial value in the caller's row buffer (row-granular
    // transactionality is the row streamer's job; this keeps a single
    // value from corrupting it even on paths that call this directly).
    let mut scratch = Vec::new();
    encode_into(&mut scratch, ty, value, column)?;
    buffer.extend_from_slice(&scratch);
    Ok(())
}

fn encode_into(buffer: &mut Vec<u8>, ty: &DataType, value: &Value, column: usize) -> Result<(), Error> {
    match ty {
        DataType::Nullable(inner) => {
            if value.is_null() {
                buffer.put_u8(1);
            } else {
                buffer.put_u8(0);
                encode_into(buffer, inner, value, column)?;
            }
            return Ok(());
        }
        _ if value.is_null() => {
            return Err(Error::validation(column, format!("unexpected null for type {ty}")));
        }
        _ => {}
    }

    match ty {
        DataType::UInt8 => buffer.put_u8(expect_u8(value, column)?),
        DataType::UInt16 => buffer.put_u16_le(expect_u16(value, column)?),
        DataType::UInt32 => buffer.put_u32_le(expect_u32(value, column)?),
        DataType::UInt64 => buffer.put_u64_le(expect_u64(value, column)?),
        DataType::UInt128 => buffer.put_u128_le(expect_u128(value, column)?),
        DataType::UInt256 => buffer.put_slice(&expect_u256(value, column)?.to_le_bytes()),
        DataType::Int8 => buffer.put_i8(expect_i8(value, column)?),
        DataType::Int16 => buffer.put_i16_le(expect_i16(value, column)?),
        DataType::Int32 => buffer.put_i32_le(expect_i32(value, column)?),
        DataType::Int64 => buffer.put_i64_le(expect_i64(value, column)?),
        DataType::Int128 => buffer.put_i128_le(expect_i128(value, column)?),
        DataType::Int256 => buffer.put_slice(&expect_i256(value, column)?.to_le_bytes()),
        DataType::Float32 => buffer.put_f32_le(expect_f32(value, column)?),
        DataType::Float64 => buffer.put_f64_le(expect_f64(value, column)?),
        DataType::Bool => buffer.put_u8(if expect_bool(value, column)? { 1 } else { 0 }),
        DataType::String => write_string_bytes(buffer, &expect_bytes(value, column)?),
        DataType::FixedString(n) => encode_fixed_string(buffer, value, *n, column)?,
        DataType::Date => buffer.put_u16_le(expect_date(value, column)? as u16),
        DataType::Date32 => buffer.put_i32_le(expect_date(value, column)? as i32),
        DataType::DateTime(_) => buffer.put_u32_le(expect_datetime(value, 0, column)? as u32),
        DataType::DateTime64(scale, _) => buffer.put_i64_le(expect_datetime(value, *scale, column)?),
        DataType::Uuid => encode_uuid(buffer, value, column)?,
        DataType::Ipv4 => encode_ipv4(buffer, value, column)?,
        DataType::Ipv6 => encode_ipv6(buffer, value, column)?,
        DataType::Decimal(_, _, width) => encode_decimal(buffer, value, *width, column)?,
        DataType::Enum(kind, mapping) => encode_enum(buffer, value, *kind, mapping, column)?,
        DataType::Nullable(_) => unreachable!("handled above"),
        DataType::Array(elem) => encode_array(buffer, value, elem, column)?,
        DataType::Map(key, val) => encode_map(buffer, value, key, val, column)?,
        DataType::Tuple(elems) => encode_tuple(buffer, value, elems, column)?,
        DataType::LowCardinality(inner) => encode_into(buffer, inner, value, column)?,
    }
    Ok(())
}

macro_rules! expect_fn {
    ($name:ident, $variant:ident, $out:ty) => {
        fn $name(value: &Value, column: usize) -> Result<$out, Error> {
            match value {
                Value::$variant(v) => Ok(*v),
                other => Err(Error::validation(
                    column,
                    format!("expected {}, got {}", stringify!($variant), other.kind_name()),
                )),
            }
        }
    };
}

expect_fn!(expect_u8, UInt8, u8);
expect_fn!(expect_u16, UInt16, u16);
expect_fn!(expect_u32, UInt32, u32);
expect_fn!(expect_u64, UInt64, u64);
expect_fn!(expect_u128, UInt128, u128);
expect_fn!(expect_i8, Int8, i8);
expect_fn!(expect_i16, Int16, i16);
expect_fn!(expect_i32, Int32, i32);
expect_fn!(expect_i64, Int64, i64);
expect_fn!(expect_i128, Int128, i128);
expect_fn!(expect_f32, Float32, f32);
expect_fn!(expect_f64, Float64, f64);
expect_fn!(expect_bool, Bool, bool);

fn expect_u256(value: &Value, column: usize) -> Result<crate::int256::UInt256, Error> {
    match value {
        Value::UInt256(v) => Ok(*v),
        other => Err(Error::validation(column, format!("expected UInt256, got {}", other.kind_name()))),
    }
}

fn expect_i256(value: &Value, column: usize) -> Result<crate::int256::Int256, Error> {
    match value {
        Value::Int256(v) => Ok(*v),
        other => Err(Error::validation(column, format!("expected Int256, got {}", other.kind_name()))),
    }
}

fn expect_bytes(value: &Value, column: usize) -> Result<bytes::Bytes, Error> {
    match value {
        Value::String(b) | Value::FixedString(b) => Ok(b.clone()),
        other => Err(Error::validation(column, format!("expected a byte string, got {}", other.kind_name()))),
    }
}

fn expect_date(value: &Value, column: usize) -> Result<i64, Error> {
    match value {
        Value::Date(days) => Ok(*days),
        other => Err(Error::validation(column, format!("expected Date, got {}", other.kind_name()))),
    }
}

fn expect_datetime(value: &Value, expected_scale: u8, column: usize) -> Result<i64, Error> {
    match value {
        Value::DateTime { ticks, scale } if *scale == expected_scale => Ok(*ticks),
        Value::DateTime { scale, .. } => Err(Error::validation(
            column,
            format!("DateTime scale mismatch: column expects {expected_scale}, value has {scale}"),
        )),
        other => Err(Error::validation(column, format!("expected DateTime, got {}", other.kind_name()))),
    }
}

fn encode_fixed_string(buffer: &mut Vec<u8>, value: &Value, n: usize, column: usize) -> Result<(), Error> {
    let bytes = expect_bytes(value, column)?;
    if bytes.len() > n {
        return Err(Error::validation(
            column,
            format!("FixedString({n}) input is {} bytes, too long", bytes.len()),
        ));
    }
    buffer.put_slice(&bytes);
    buffer.put_bytes(0, n - bytes.len());
    Ok(())
}

fn encode_uuid(buffer: &mut Vec<u8>, value: &Value, column: usize) -> Result<(), Error> {
    let Value::Uuid(uuid) = value else {
        return Err(Error::validation(column, format!("expected UUID, got {}", value.kind_name())));
    };
    let mut bytes = uuid.into_bytes();
    crate::uuid::transform(&mut bytes);
    buffer.put_slice(&bytes);
    Ok(())
}

fn encode_ipv4(buffer: &mut Vec<u8>, value: &Value, column: usize) -> Result<(), Error> {
    let Value::Ipv4(addr) = value else {
        return Err(Error::validation(column, format!("expected IPv4, got {}", value.kind_name())));
    };
    let mut octets = addr.octets();
    octets.reverse();
    buffer.put_slice(&octets);
    Ok(())
}

fn encode_ipv6(buffer: &mut Vec<u8>, value: &Value, column: usize) -> Result<(), Error> {
    let Value::Ipv6(addr) = value else {
        return Err(Error::validation(column, format!("expected IPv6, got {}", value.kind_name())));
    };
    buffer.put_slice(&addr.octets());
    Ok(())
}

fn encode_decimal(
    buffer: &mut Vec<u8>,
    value: &Value,
    width: rowbinary_types::DecimalWidth,
    column: usize,
) -> Result<(), Error> {
    let Value::Decimal(decimal) = value else {
        return Err(Error::validation(column, format!("expected Decimal, got {}", value.kind_name())));
    };
    if decimal.width() != width {
        return Err(Error::validation(column, "Decimal coefficient width does not match column"));
    }
    match decimal {
        crate::decimal::DecimalValue::I32 { coefficient, .. } => buffer.put_i32_le(*coefficient),
        crate::decimal::DecimalValue::I64 { coefficient, .. } => buffer.put_i64_le(*coefficient),
        crate::decimal::DecimalValue::I128 { coefficient, .. } => buffer.put_i128_le(*coefficient),
        crate::decimal::DecimalValue::I256 { coefficient, .. } => buffer.put_slice(&coefficient.to_le_bytes()),
    }
    Ok(())
}

fn encode_enum(
    buffer: &mut Vec<u8>,
    value: &Value,
    kind: rowbinary_types::EnumKind,
    mapping: &std::collections::BTreeMap<i16, String>,
    column: usize,
) -> Result<(), Error> {
    let Value::Enum(label) = value else {
        return Err(Error::validation(column, format!("expected Enum, got {}", value.kind_name())));
    };
    let code = mapping
        .iter()
        .find(|(_, name)| *name == label)
        .map(|(code, _)| *code)
        .ok_or_else(|| Error::validation(column, format!("enum label '{label}' not in mapping")))?;
    match kind {
        rowbinary_types::EnumKind::Enum8 => buffer.put_i8(code as i8),
        rowbinary_types::EnumKind::Enum16 => buffer.put_i16_le(code),
    }
    Ok(())
}

fn encode_array(buffer: &mut Vec<u8>, value: &Value, elem: &DataType, column: usize) -> Result<(), Error> {
    let Value::Array(items) = value else {
        return Err(Error::validation(column, format!("expected Array, got {}", value.kind_name())));
    };
    write_varint(buffer, items.len() as u64);
    for item in items {
        encode_into(buffer, elem, item, column)?;
    }
    Ok(())
}

fn encode_map(
    buffer: &mut Vec<u8>,
    value: &Value,
    key_ty: &DataType,
    val_ty: &DataType,
    column: usize,
) -> Result<(), Error> {
    let Value::Map(entries) = value else {
        return Err(Error::validation(column, format!("expected Map, got {}", value.kind_name())));
    };
    write_varint(buffer, entries.len() as u64);
    for (k, v) in entries {
        encode_into(buffer, key_ty, k, column)?;
        encode_into(buffer, val_ty, v, column)?;
    }
    Ok(())
}

fn encode_tuple(buffer: &mut Vec<u8>, value: &Value, elems: &[DataType], column: usize) -> Result<(), Error> {
    let Value::Tuple(items) = value else {
        return Err(Error::validation(column, format!("expected Tuple, got {}", value.kind_name())));
    };
    if items.len() != elems.len() {
        return Err(Error::validation(
            column,
            format!("Tuple has {} elements, column declares {}", items.len(), elems.len()),
        ));
    }
    for (item, ty) in items.iter().zip(elems) {
        encode_into(buffer, ty, item, column)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn encodes_scalar_row() {
        let mut buf = Vec::new();
        encode_value(&mut buf, &DataType::UInt32, &Value::UInt32(1), 0).unwrap();
        encode_value(&mut buf, &DataType::String, &Value::from("Alice"), 1).unwrap();
        encode_value(&mut buf, &DataType::Bool, &Value::Bool(true), 2).unwrap();
        assert_eq!(buf, vec![1, 0, 0, 0, 5, b'A', b'l', b'i', b'c', b'e', 1]);
    }

    #[test]
    fn encodes_nullable_string() {
        let ty = DataType::Nullable(Box::new(DataType::String));
        let mut buf = Vec::new();
        encode_value(&mut buf, &ty, &Value::Null, 0).unwrap();
        encode_value(&mut buf, &ty, &Value::from("hi"), 0).unwrap();
        assert_eq!(buf, vec![1, 0, 2, b'h', b'i']);
    }

    #[test]
    fn encodes_array_of_uint32() {
        let ty = DataType::Array(Box::new(DataType::UInt32));
        let value = Value::Array(vec![Value::UInt32(1), Value::UInt32(2), Value::UInt32(3)]);
        let mut buf = Vec::new();
        encode_value(&mut buf, &ty, &value, 0).unwrap();
        assert_eq!(buf, vec![3, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
    }

    #[test]
    fn encodes_fixed_string_padding() {
        let ty = DataType::FixedString(5);
        let mut buf = Vec::new();
        encode_value(&mut buf, &ty, &Value::from("hi"), 0).unwrap();
        assert_eq!(buf, vec![b'h', b'i', 0, 0, 0]);
    }

    #[test]
    fn rejects_fixed_string_overflow() {
        let ty = DataType::FixedString(2);
        let mut buf = Vec::new();
        assert!(encode_value(&mut buf, &ty, &Value::from("abc"), 0).is_err());
    }

    #[test]
    fn rejects_enum_label_not_in_mapping() {
        let mapping = std::collections::BTreeMap::from([(1i16, "a".to_string())]);
        let ty = DataType::Enum(rowbinary_types::EnumKind::Enum8, mapping);
        let mut buf = Vec::new();
        assert!(encode_value(&mut buf, &ty, &Value::Enum("missing".to_string()), 0).is_err());
    }
}
