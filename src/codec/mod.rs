//! Type codec dispatch (C4): encode, decode, and skip-only entry points for
//! every type variant in the grammar.
//!
//! None of these re-parse a type string per value: a [`rowbinary_types::Schema`]
//! already holds one parsed [`rowbinary_types::DataType`] tree per column, built
//! once when the schema is constructed or read from a header, and every row
//! walks that tree directly.

mod decode;
mod encode;
pub(crate) mod primitive;
mod skip;

pub(crate) use decode::decode_value;
pub(crate) use encode::encode_value;
pub(crate) use skip::skip_value;
