//! LEB128 varint helpers shared by the header parser and the row codec.

use crate::error::SchemaError;
use bytes::{Buf, BufMut};

/// Reads an unsigned LEB128 varint, failing if more than 10 bytes (64 bits worth
/// of 7-bit groups) are consumed without terminating.
pub fn read_leb128(buffer: &mut &[u8]) -> Result<u64, SchemaError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        if buffer.remaining() < 1 {
            return Err(SchemaError::NotEnoughData(
                "decoding LEB128, 0 bytes remaining".to_string(),
            ));
        }
        let byte = buffer.get_u8();
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 64 {
            return Err(SchemaError::NotEnoughData(
                "decoding LEB128, value exceeds 64 bits".to_string(),
            ));
        }
    }
    Ok(value)
}

/// Writes `value` as an unsigned LEB128 varint.
pub fn put_leb128(mut buffer: impl BufMut, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buffer.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_known_values() {
        let test_values = [
            0u64,
            1,
            127,
            128,
            255,
            624_773,
            624_485,
            300_000,
            10_000_000,
            u32::MAX as u64,
            (u32::MAX as u64) + 1,
            u64::MAX,
        ];
        for value in test_values {
            let mut buf = Vec::new();
            put_leb128(&mut buf, value);
            let decoded = read_leb128(&mut buf.as_slice()).unwrap();
            assert_eq!(decoded, value, "roundtrip failed for {value}");
        }
    }

    #[test]
    fn matches_known_byte_sequences() {
        assert_eq!(read_leb128(&mut [0x85, 0x91, 0x26].as_slice()).unwrap(), 624_773);
        assert_eq!(read_leb128(&mut [0xE5, 0x8E, 0x26].as_slice()).unwrap(), 624_485);

        let mut buf = Vec::new();
        put_leb128(&mut buf, 624_485);
        assert_eq!(buf, vec![0xe5, 0x8e, 0x26]);
    }

    #[test]
    fn truncated_input_errors() {
        assert!(read_leb128(&mut [0x80].as_slice()).is_err());
        assert!(read_leb128(&mut [].as_slice()).is_err());
    }
}
