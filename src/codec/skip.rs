//! Skip-only decode (C4's second entry point, per the design notes): consumes
//! the bytes of a value without materializing it. Used by the seekable
//! reader's lazy intra-frame row-offset computation, where only the byte
//! length of each row is needed, not its decoded contents.

use bytes::Buf;
use rowbinary_types::DataType;

use super::primitive::{read_exact, read_varint, skip_string_bytes};
use crate::error::Error;

/// Advances `buffer` past one value of type `ty` without building a
/// [`crate::value::Value`] for it.
pub(crate) fn skip_value(buffer: &mut &[u8], ty: &DataType, column: usize) -> Result<(), Error> {
    if let DataType::Nullable(inner) = ty {
        let tag = read_exact::<1>(buffer, column)?[0];
        return if tag == 0 { skip_value(buffer, inner, column) } else { Ok(()) };
    }

    match ty {
        DataType::UInt8 | DataType::Int8 | DataType::Bool => advance(buffer, 1, column)?,
        DataType::UInt16 | DataType::Int16 => advance(buffer, 2, column)?,
        DataType::UInt32 | DataType::Int32 | DataType::Float32 | DataType::Date32 | DataType::DateTime(_) => {
            advance(buffer, 4, column)?
        }
        DataType::UInt64 | DataType::Int64 | DataType::Float64 => advance(buffer, 8, column)?,
        DataType::Date => advance(buffer, 2, column)?,
        DataType::DateTime64(_, _) => advance(buffer, 8, column)?,
        DataType::UInt128 | DataType::Int128 => advance(buffer, 16, column)?,
        DataType::UInt256 | DataType::Int256 => advance(buffer, 32, column)?,
        DataType::Uuid | DataType::Ipv6 => advance(buffer, 16, column)?,
        DataType::Ipv4 => advance(buffer, 4, column)?,
        DataType::String => skip_string_bytes(buffer, column)?,
        DataType::FixedString(n) => advance(buffer, *n, column)?,
        DataType::Decimal(_, _, width) => advance(buffer, width.byte_width(), column)?,
        DataType::Enum(kind, _) => {
            let width = match kind {
                rowbinary_types::EnumKind::Enum8 => 1,
                rowbinary_types::EnumKind::Enum16 => 2,
            };
            advance(buffer, width, column)?;
        }
        DataType::Nullable(_) => unreachable!("handled above"),
        DataType::Array(elem) => {
            let count = read_varint(buffer, column)?;
            for _ in 0..count {
                skip_value(buffer, elem, column)?;
            }
        }
        DataType::Map(key, val) => {
            let count = read_varint(buffer, column)?;
            for _ in 0..count {
                skip_value(buffer, key, column)?;
                skip_value(buffer, val, column)?;
            }
        }
        DataType::Tuple(elems) => {
            for elem in elems {
                skip_value(buffer, elem, column)?;
            }
        }
        DataType::LowCardinality(inner) => skip_value(buffer, inner, column)?,
    }
    Ok(())
}

fn advance(buffer: &mut &[u8], n: usize, column: usize) -> Result<(), Error> {
    if buffer.remaining() < n {
        return Err(Error::codec(column, format!("expected {n} bytes"), buffer.remaining()));
    }
    buffer.advance(n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode::decode_value;
    use crate::codec::encode::encode_value;
    use crate::value::Value;

    #[test]
    fn skip_consumes_exactly_what_decode_consumes() {
        let ty = DataType::Array(Box::new(DataType::Nullable(Box::new(DataType::String))));
        let value = Value::Array(vec![Value::Null, Value::from("hi"), Value::Null]);
        let mut buf = Vec::new();
        encode_value(&mut buf, &ty, &value, 0).unwrap();
        buf.extend_from_slice(b"TAIL");

        let mut skip_slice = buf.as_slice();
        skip_value(&mut skip_slice, &ty, 0).unwrap();
        assert_eq!(skip_slice, b"TAIL");

        let mut decode_slice = buf.as_slice();
        let decoded = decode_value(&mut decode_slice, &ty, 0).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decode_slice, b"TAIL");
    }

    #[test]
    fn skip_tuple_and_map() {
        let ty = DataType::Tuple(vec![
            DataType::UInt8,
            DataType::Map(Box::new(DataType::String), Box::new(DataType::UInt32)),
        ]);
        let value = Value::Tuple(vec![
            Value::UInt8(9),
            Value::Map(vec![(Value::from("a"), Value::UInt32(1))]),
        ]);
        let mut buf = Vec::new();
        encode_value(&mut buf, &ty, &value, 0).unwrap();
        let mut slice = buf.as_slice();
        skip_value(&mut slice, &ty, 0).unwrap();
        assert!(slice.is_empty());
    }
}
