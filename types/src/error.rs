use std::fmt;

/// Errors raised while tokenizing, parsing, or validating a ClickHouse type string
/// or a [`crate::Schema`] built from one.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unexpected end of type string while parsing '{0}'")]
    UnexpectedEof(String),

    #[error("unknown data type '{0}'")]
    UnknownType(String),

    #[error("invalid type parameters for '{type_name}': {message}")]
    InvalidParams { type_name: String, message: String },

    #[error("unexpected token '{found}' at byte {pos} while parsing '{input}', expected {expected}")]
    UnexpectedToken {
        input: String,
        pos: usize,
        found: String,
        expected: String,
    },

    #[error("trailing data '{0}' after a complete type")]
    TrailingData(String),

    #[error("duplicate column name '{0}' in schema")]
    DuplicateColumn(String),

    #[error("empty column name in schema")]
    EmptyColumnName,

    #[error("schema has no columns")]
    EmptyColumns,

    #[error("not enough data: {0}")]
    NotEnoughData(String),

    #[error("header parsing error: {0}")]
    HeaderParsingError(String),

    #[error("schema mismatch: {0}")]
    Mismatch(String),
}

impl SchemaError {
    pub(crate) fn invalid_params(type_name: impl Into<String>, message: impl fmt::Display) -> Self {
        SchemaError::InvalidParams {
            type_name: type_name.into(),
            message: message.to_string(),
        }
    }
}
