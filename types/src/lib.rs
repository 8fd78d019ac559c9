//! Type grammar parser and schema model for the RowBinary wire format.
//!
//! This crate owns the pieces that are purely about *shape*: parsing a
//! ClickHouse type string into a [`DataType`] tree, and grouping named
//! columns into a [`Schema`]. It knows nothing about encoding row values —
//! that lives in the `rowbinary` crate, one layer up, which compiles a
//! codec plan from the types this crate produces.

mod error;
mod grammar;
pub mod leb128;
mod schema;
mod types;

pub use error::SchemaError;
pub use schema::{Column, Schema};
pub use types::{DataType, DecimalWidth, EnumKind};
