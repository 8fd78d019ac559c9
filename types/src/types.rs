use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use crate::error::SchemaError;

/// A parsed ClickHouse type, as described in the RowBinary type grammar.
///
/// Every variant round-trips through [`Display`] to a canonical string form,
/// which is what `RowBinaryWithNamesAndTypes` headers carry on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Float32,
    Float64,
    Bool,
    String,
    FixedString(usize),
    Date,
    Date32,
    DateTime(Option<String>),
    DateTime64(u8, Option<String>),
    Uuid,
    Ipv4,
    Ipv6,
    Decimal(u8, u8, DecimalWidth),
    Enum(EnumKind, BTreeMap<i16, String>),
    Nullable(Box<DataType>),
    Array(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Tuple(Vec<DataType>),
    LowCardinality(Box<DataType>),
}

/// The storage width selected for a `Decimal(P, S)` coefficient, chosen from
/// the precision `P` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalWidth {
    Bits32,
    Bits64,
    Bits128,
    Bits256,
}

impl DecimalWidth {
    pub fn for_precision(precision: u8) -> Result<Self, SchemaError> {
        match precision {
            0 => Err(SchemaError::invalid_params(
                "Decimal",
                "precision must be at least 1",
            )),
            1..=9 => Ok(DecimalWidth::Bits32),
            10..=18 => Ok(DecimalWidth::Bits64),
            19..=38 => Ok(DecimalWidth::Bits128),
            39..=76 => Ok(DecimalWidth::Bits256),
            p => Err(SchemaError::invalid_params(
                "Decimal",
                format!("precision {p} exceeds the maximum of 76"),
            )),
        }
    }

    pub fn byte_width(self) -> usize {
        match self {
            DecimalWidth::Bits32 => 4,
            DecimalWidth::Bits64 => 8,
            DecimalWidth::Bits128 => 16,
            DecimalWidth::Bits256 => 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    Enum8,
    Enum16,
}

impl EnumKind {
    pub fn name(self) -> &'static str {
        match self {
            EnumKind::Enum8 => "Enum8",
            EnumKind::Enum16 => "Enum16",
        }
    }
}

impl DataType {
    /// Parses a canonical ClickHouse type string, e.g. `"Array(Nullable(String))"`.
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        crate::grammar::parse_type(input)
    }

    /// Validates the structural invariants that are not enforced by construction:
    /// `Nullable` may not wrap another `Nullable`, `Array`, or `Map`.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let DataType::Nullable(inner) = self {
            match inner.as_ref() {
                DataType::Nullable(_) => {
                    return Err(SchemaError::invalid_params(
                        "Nullable",
                        "Nullable(Nullable(T)) is not allowed",
                    ));
                }
                DataType::Array(_) => {
                    return Err(SchemaError::invalid_params(
                        "Nullable",
                        "Nullable(Array(T)) is not allowed",
                    ));
                }
                DataType::Map(_, _) => {
                    return Err(SchemaError::invalid_params(
                        "Nullable",
                        "Nullable(Map(K, V)) is not allowed",
                    ));
                }
                _ => {}
            }
        }
        match self {
            DataType::Nullable(inner)
            | DataType::Array(inner)
            | DataType::LowCardinality(inner) => inner.validate(),
            DataType::Map(k, v) => {
                k.validate()?;
                v.validate()
            }
            DataType::Tuple(elems) => elems.iter().try_for_each(DataType::validate),
            _ => Ok(()),
        }
    }

    /// The canonical form used for equality and for `RowBinaryWithNamesAndTypes` headers.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int8 => write!(f, "Int8"),
            DataType::Int16 => write!(f, "Int16"),
            DataType::Int32 => write!(f, "Int32"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::Int128 => write!(f, "Int128"),
            DataType::Int256 => write!(f, "Int256"),
            DataType::UInt8 => write!(f, "UInt8"),
            DataType::UInt16 => write!(f, "UInt16"),
            DataType::UInt32 => write!(f, "UInt32"),
            DataType::UInt64 => write!(f, "UInt64"),
            DataType::UInt128 => write!(f, "UInt128"),
            DataType::UInt256 => write!(f, "UInt256"),
            DataType::Float32 => write!(f, "Float32"),
            DataType::Float64 => write!(f, "Float64"),
            DataType::Bool => write!(f, "Bool"),
            DataType::String => write!(f, "String"),
            DataType::FixedString(n) => write!(f, "FixedString({n})"),
            DataType::Date => write!(f, "Date"),
            DataType::Date32 => write!(f, "Date32"),
            DataType::DateTime(None) => write!(f, "DateTime"),
            DataType::DateTime(Some(tz)) => write!(f, "DateTime('{tz}')"),
            DataType::DateTime64(scale, None) => write!(f, "DateTime64({scale})"),
            DataType::DateTime64(scale, Some(tz)) => write!(f, "DateTime64({scale}, '{tz}')"),
            DataType::Uuid => write!(f, "UUID"),
            DataType::Ipv4 => write!(f, "IPv4"),
            DataType::Ipv6 => write!(f, "IPv6"),
            DataType::Decimal(p, s, _) => write!(f, "Decimal({p}, {s})"),
            DataType::Enum(kind, values) => {
                let body = values
                    .iter()
                    .map(|(code, name)| format!("'{}' = {code}", escape_enum_label(name)))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({body})", kind.name())
            }
            DataType::Nullable(inner) => write!(f, "Nullable({inner})"),
            DataType::Array(inner) => write!(f, "Array({inner})"),
            DataType::Map(k, v) => write!(f, "Map({k}, {v})"),
            DataType::Tuple(elems) => {
                let body = elems.iter().map(DataType::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "Tuple({body})")
            }
            DataType::LowCardinality(inner) => write!(f, "LowCardinality({inner})"),
        }
    }
}

fn escape_enum_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_simple_types() {
        assert_eq!(DataType::UInt8.to_string(), "UInt8");
        assert_eq!(DataType::Int256.to_string(), "Int256");
        assert_eq!(DataType::FixedString(16).to_string(), "FixedString(16)");
        assert_eq!(DataType::Uuid.to_string(), "UUID");
    }

    #[test]
    fn displays_nested_types() {
        let t = DataType::Array(Box::new(DataType::Nullable(Box::new(DataType::String))));
        assert_eq!(t.to_string(), "Array(Nullable(String))");
    }

    #[test]
    fn nullable_array_rejected() {
        let t = DataType::Nullable(Box::new(DataType::Array(Box::new(DataType::UInt8))));
        assert!(t.validate().is_err());
    }

    #[test]
    fn nullable_nullable_rejected() {
        let t = DataType::Nullable(Box::new(DataType::Nullable(Box::new(DataType::UInt8))));
        assert!(t.validate().is_err());
    }
}
