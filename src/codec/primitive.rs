//! Primitive codec (C3): little-endian fixed-width integers/floats and the
//! LEB128 varint, wired to this crate's [`Error`] type.

use bytes::{Buf, BufMut};

use crate::error::Error;

/// Reads an unsigned LEB128 varint used for string/array/map lengths and
/// header column counts.
pub(crate) fn read_varint(buffer: &mut &[u8], column: usize) -> Result<u64, Error> {
    rowbinary_types::leb128::read_leb128(buffer).map_err(|e| Error::codec(column, e, buffer.remaining()))
}

/// Writes an unsigned LEB128 varint.
pub(crate) fn write_varint(buffer: &mut impl BufMut, value: u64) {
    rowbinary_types::leb128::put_leb128(buffer, value);
}

/// Reads exactly `N` bytes or fails with a [`Error::Codec`] naming the
/// column and the shortfall.
pub(crate) fn read_exact<const N: usize>(buffer: &mut &[u8], column: usize) -> Result<[u8; N], Error> {
    if buffer.remaining() < N {
        return Err(Error::codec(
            column,
            format!("expected {N} bytes"),
            buffer.remaining(),
        ));
    }
    let mut out = [0u8; N];
    buffer.copy_to_slice(&mut out);
    Ok(out)
}

/// Reads a length-prefixed byte string: a varint length followed by that
/// many raw bytes.
pub(crate) fn read_string_bytes(buffer: &mut &[u8], column: usize) -> Result<bytes::Bytes, Error> {
    let len = read_varint(buffer, column)? as usize;
    if buffer.remaining() < len {
        return Err(Error::codec(
            column,
            format!("string of length {len}"),
            buffer.remaining(),
        ));
    }
    Ok(buffer.copy_to_bytes(len))
}

/// Writes a length-prefixed byte string.
pub(crate) fn write_string_bytes(buffer: &mut impl BufMut, bytes: &[u8]) {
    write_varint(buffer, bytes.len() as u64);
    buffer.put_slice(bytes);
}

/// Skips a length-prefixed byte string without materializing it.
pub(crate) fn skip_string_bytes(buffer: &mut &[u8], column: usize) -> Result<(), Error> {
    let len = read_varint(buffer, column)? as usize;
    if buffer.remaining() < len {
        return Err(Error::codec(
            column,
            format!("string of length {len}"),
            buffer.remaining(),
        ));
    }
    buffer.advance(len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_round_trips() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 624_485);
        let mut slice = buf.as_slice();
        assert_eq!(read_varint(&mut slice, 0).unwrap(), 624_485);
    }

    #[test]
    fn read_exact_reports_shortfall() {
        let mut slice: &[u8] = &[1, 2];
        let err = read_exact::<4>(&mut slice, 3).unwrap_err();
        assert!(matches!(err, Error::Codec { column: 3, remaining: 2, .. }));
    }

    #[test]
    fn string_bytes_round_trip() {
        let mut buf = Vec::new();
        write_string_bytes(&mut buf, b"hello");
        let mut slice = buf.as_slice();
        assert_eq!(&read_string_bytes(&mut slice, 0).unwrap()[..], b"hello");
    }
}
