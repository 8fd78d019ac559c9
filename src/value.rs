//! Host-independent value representation (C2 of the wire-format design).
//!
//! A [`Value`] carries no type information of its own — the declared
//! [`rowbinary_types::DataType`] of its column decides how it is encoded.
//! Encoding validates the value against that type rather than trusting the
//! variant chosen by the caller (e.g. a `UInt64` value placed in a `UInt8`
//! column is range-checked, not silently truncated).

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use uuid::Uuid;

use crate::decimal::DecimalValue;
use crate::int256::{Int256, UInt256};

/// A decoded or to-be-encoded row value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    UInt256(UInt256),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    Int256(Int256),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    /// A variable-length byte string (`String` columns). Not required to be
    /// valid UTF-8 on decode; encoding from a Rust `&str`/`String` always
    /// produces valid UTF-8 bytes.
    String(Bytes),
    /// The unpadded payload of a `FixedString(n)` column: always exactly
    /// `n` bytes once produced by this crate's decoder.
    FixedString(Bytes),
    /// Days since 1970-01-01 UTC (`Date` is `u16`, `Date32` is `i32`; both
    /// are widened to `i64` here since the value itself doesn't know which
    /// width produced it).
    Date(i64),
    /// Sub-second ticks since the epoch at the column's declared `scale`,
    /// or whole seconds for plain `DateTime` (`scale == 0`).
    DateTime { ticks: i64, scale: u8 },
    Uuid(Uuid),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Decimal(DecimalValue),
    /// The symbolic label of an `Enum8`/`Enum16` value, already resolved
    /// from its wire-level integer code.
    Enum(String),
    Null,
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type name this variant corresponds to, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::UInt8(_) => "UInt8",
            Value::UInt16(_) => "UInt16",
            Value::UInt32(_) => "UInt32",
            Value::UInt64(_) => "UInt64",
            Value::UInt128(_) => "UInt128",
            Value::UInt256(_) => "UInt256",
            Value::Int8(_) => "Int8",
            Value::Int16(_) => "Int16",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Int128(_) => "Int128",
            Value::Int256(_) => "Int256",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
            Value::Bool(_) => "Bool",
            Value::String(_) => "String",
            Value::FixedString(_) => "FixedString",
            Value::Date(_) => "Date",
            Value::DateTime { .. } => "DateTime",
            Value::Uuid(_) => "UUID",
            Value::Ipv4(_) => "IPv4",
            Value::Ipv6(_) => "IPv6",
            Value::Decimal(_) => "Decimal",
            Value::Enum(_) => "Enum",
            Value::Null => "Null",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
            Value::Tuple(_) => "Tuple",
        }
    }
}

macro_rules! impl_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        }
    };
}

impl_from!(u8, UInt8);
impl_from!(u16, UInt16);
impl_from!(u32, UInt32);
impl_from!(u64, UInt64);
impl_from!(u128, UInt128);
impl_from!(i8, Int8);
impl_from!(i16, Int16);
impl_from!(i32, Int32);
impl_from!(i64, Int64);
impl_from!(i128, Int128);
impl_from!(bool, Bool);
impl_from!(f32, Float32);
impl_from!(f64, Float64);
impl_from!(Uuid, Uuid);
impl_from!(Ipv4Addr, Ipv4);
impl_from!(Ipv6Addr, Ipv6);

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Bytes::from(v.into_bytes()))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::String(Bytes::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_conversions_pick_matching_variant() {
        assert_eq!(Value::from(7u8), Value::UInt8(7));
        assert_eq!(Value::from(-3i32), Value::Int32(-3));
        assert_eq!(Value::from("hi"), Value::String(Bytes::from_static(b"hi")));
        assert_eq!(Value::from(Option::<u8>::None), Value::Null);
        assert_eq!(Value::from(Some(5u8)), Value::UInt8(5));
    }

    #[test]
    fn kind_name_matches_variant() {
        assert_eq!(Value::UInt64(1).kind_name(), "UInt64");
        assert_eq!(Value::Null.kind_name(), "Null");
    }
}
