//! Type codec dispatch, decode direction (C4).

use bytes::Buf;
use rowbinary_types::DataType;
use uuid::Uuid;

use super::primitive::{read_exact, read_string_bytes, read_varint};
use crate::decimal::DecimalValue;
use crate::error::Error;
use crate::int256::{Int256, UInt256};
use crate::value::Value;

/// Decodes one value of type `ty` from the front of `buffer`, advancing it
/// past the bytes consumed.
pub(crate) fn decode_value(buffer: &mut &[u8], ty: &DataType, column: usize) -> Result<Value, Error> {
    if let DataType::Nullable(inner) = ty {
        let tag = read_exact::<1>(buffer, column)?[0];
        return if tag == 0 {
            decode_value(buffer, inner, column)
        } else {
            Ok(Value::Null)
        };
    }

    Ok(match ty {
        DataType::UInt8 => Value::UInt8(read_exact::<1>(buffer, column)?[0]),
        DataType::UInt16 => Value::UInt16(u16::from_le_bytes(read_exact(buffer, column)?)),
        DataType::UInt32 => Value::UInt32(u32::from_le_bytes(read_exact(buffer, column)?)),
        DataType::UInt64 => Value::UInt64(u64::from_le_bytes(read_exact(buffer, column)?)),
        DataType::UInt128 => Value::UInt128(u128::from_le_bytes(read_exact(buffer, column)?)),
        DataType::UInt256 => Value::UInt256(UInt256::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Int8 => Value::Int8(read_exact::<1>(buffer, column)?[0] as i8),
        DataType::Int16 => Value::Int16(i16::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Int32 => Value::Int32(i32::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Int64 => Value::Int64(i64::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Int128 => Value::Int128(i128::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Int256 => Value::Int256(Int256::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Float32 => Value::Float32(f32::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Float64 => Value::Float64(f64::from_le_bytes(read_exact(buffer, column)?)),
        DataType::Bool => Value::Bool(read_exact::<1>(buffer, column)?[0] != 0),
        DataType::String => Value::String(read_string_bytes(buffer, column)?),
        DataType::FixedString(n) => Value::FixedString(read_fixed_string(buffer, *n, column)?),
        DataType::Date => Value::Date(u16::from_le_bytes(read_exact(buffer, column)?) as i64),
        DataType::Date32 => Value::Date(i32::from_le_bytes(read_exact(buffer, column)?) as i64),
        DataType::DateTime(_) => Value::DateTime {
            ticks: u32::from_le_bytes(read_exact(buffer, column)?) as i64,
            scale: 0,
        },
        DataType::DateTime64(scale, _) => Value::DateTime {
            ticks: i64::from_le_bytes(read_exact(buffer, column)?),
            scale: *scale,
        },
        DataType::Uuid => Value::Uuid(decode_uuid(buffer, column)?),
        DataType::Ipv4 => Value::Ipv4(decode_ipv4(buffer, column)?),
        DataType::Ipv6 => Value::Ipv6(decode_ipv6(buffer, column)?),
        DataType::Decimal(_, scale, width) => Value::Decimal(decode_decimal(buffer, *scale, *width, column)?),
        DataType::Enum(kind, mapping) => Value::Enum(decode_enum(buffer, *kind, mapping, column)?),
        DataType::Nullable(_) => unreachable!("handled above"),
        DataType::Array(elem) => Value::Array(decode_array(buffer, elem, column)?),
        DataType::Map(key, val) => Value::Map(decode_map(buffer, key, val, column)?),
        DataType::Tuple(elems) => Value::Tuple(decode_tuple(buffer, elems, column)?),
        DataType::LowCardinality(inner) => decode_value(buffer, inner, column)?,
    })
}

fn read_fixed_string(buffer: &mut &[u8], n: usize, column: usize) -> Result<bytes::Bytes, Error> {
    if buffer.remaining() < n {
        return Err(Error::codec(column, format!("FixedString({n})"), buffer.remaining()));
    }
    Ok(buffer.copy_to_bytes(n))
}

fn decode_uuid(buffer: &mut &[u8], column: usize) -> Result<Uuid, Error> {
    let mut bytes = read_exact::<16>(buffer, column)?;
    crate::uuid::transform(&mut bytes);
    Ok(Uuid::from_bytes(bytes))
}

fn decode_ipv4(buffer: &mut &[u8], column: usize) -> Result<std::net::Ipv4Addr, Error> {
    let mut octets = read_exact::<4>(buffer, column)?;
    octets.reverse();
    Ok(std::net::Ipv4Addr::from(octets))
}

fn decode_ipv6(buffer: &mut &[u8], column: usize) -> Result<std::net::Ipv6Addr, Error> {
    let octets = read_exact::<16>(buffer, column)?;
    Ok(std::net::Ipv6Addr::from(octets))
}

fn decode_decimal(
    buffer: &mut &[u8],
    scale: u8,
    width: rowbinary_types::DecimalWidth,
    column: usize,
) -> Result<DecimalValue, Error> {
    Ok(match width {
        rowbinary_types::DecimalWidth::Bits32 => {
            DecimalValue::I32 { coefficient: i32::from_le_bytes(read_exact(buffer, column)?), scale }
        }
        rowbinary_types::DecimalWidth::Bits64 => {
            DecimalValue::I64 { coefficient: i64::from_le_bytes(read_exact(buffer, column)?), scale }
        }
        rowbinary_types::DecimalWidth::Bits128 => {
            DecimalValue::I128 { coefficient: i128::from_le_bytes(read_exact(buffer, column)?), scale }
        }
        rowbinary_types::DecimalWidth::Bits256 => {
            DecimalValue::I256 { coefficient: Int256::from_le_bytes(read_exact(buffer, column)?), scale }
        }
    })
}

fn decode_enum(
    buffer: &mut &[u8],
    kind: rowbinary_types::EnumKind,
    mapping: &std::collections::BTreeMap<i16, String>,
    column: usize,
) -> Result<String, Error> {
    let code = match kind {
        rowbinary_types::EnumKind::Enum8 => read_exact::<1>(buffer, column)?[0] as i8 as i16,
        rowbinary_types::EnumKind::Enum16 => i16::from_le_bytes(read_exact(buffer, column)?),
    };
    mapping
        .get(&code)
        .cloned()
        .ok_or_else(|| Error::validation(column, format!("enum code {code} not in mapping")))
}

fn decode_array(buffer: &mut &[u8], elem: &DataType, column: usize) -> Result<Vec<Value>, Error> {
    let count = read_varint(buffer, column)? as usize;
    let mut out = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        out.push(decode_value(buffer, elem, column)?);
    }
    Ok(out)
}

fn decode_map(
    buffer: &mut &[u8],
    key_ty: &DataType,
    val_ty: &DataType,
    column: usize,
) -> Result<Vec<(Value, Value)>, Error> {
    let count = read_varint(buffer, column)? as usize;
    let mut out = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        let key = decode_value(buffer, key_ty, column)?;
        let val = decode_value(buffer, val_ty, column)?;
        out.push((key, val));
    }
    Ok(out)
}

fn decode_tuple(buffer: &mut &[u8], elems: &[DataType], column: usize) -> Result<Vec<Value>, Error> {
    elems.iter().map(|ty| decode_value(buffer, ty, column)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scalar_row() {
        let bytes = [1u8, 0, 0, 0, 5, b'A', b'l', b'i', b'c', b'e', 1];
        let mut slice = &bytes[..];
        assert_eq!(decode_value(&mut slice, &DataType::UInt32, 0).unwrap(), Value::UInt32(1));
        assert_eq!(decode_value(&mut slice, &DataType::String, 1).unwrap(), Value::from("Alice"));
        assert_eq!(decode_value(&mut slice, &DataType::Bool, 2).unwrap(), Value::Bool(true));
        assert!(slice.is_empty());
    }

    #[test]
    fn decodes_nullable() {
        let ty = DataType::Nullable(Box::new(DataType::String));
        let bytes = [1u8, 0, 2, b'h', b'i'];
        let mut slice = &bytes[..];
        assert_eq!(decode_value(&mut slice, &ty, 0).unwrap(), Value::Null);
        assert_eq!(decode_value(&mut slice, &ty, 0).unwrap(), Value::from("hi"));
    }

    #[test]
    fn nullable_decoder_ignores_bytes_after_null_tag() {
        // Per spec: after a null (1) tag, no T-bytes follow; a decoder
        // that tried to read them anyway would desync the stream, so it
        // must not.
        let ty = DataType::Nullable(Box::new(DataType::UInt64));
        let bytes = [1u8, 42]; // 42 belongs to the *next* column, not this one.
        let mut slice = &bytes[..];
        assert_eq!(decode_value(&mut slice, &ty, 0).unwrap(), Value::Null);
        assert_eq!(slice, &[42u8]);
    }

    #[test]
    fn decodes_uuid_byte_order() {
        let ty = DataType::Uuid;
        let uuid = Uuid::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        let mut encoded = uuid.into_bytes();
        crate::uuid::transform(&mut encoded);
        let mut slice = &encoded[..];
        let Value::Uuid(decoded) = decode_value(&mut slice, &ty, 0).unwrap() else {
            panic!("expected UUID");
        };
        assert_eq!(decoded, uuid);
    }

    #[test]
    fn truncated_input_reports_codec_error() {
        let mut slice: &[u8] = &[1, 2];
        let err = decode_value(&mut slice, &DataType::UInt32, 7).unwrap_err();
        assert!(matches!(err, Error::Codec { column: 7, .. }));
    }
}
