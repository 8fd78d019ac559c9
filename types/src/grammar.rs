//! Tokenizer and recursive-descent parser for the ClickHouse type grammar.
//!
//! The teacher's own parser works by slicing substrings looking for matching
//! parentheses; that is fine for the handful of shapes ClickHouse itself
//! emits but does not give clean error positions. This one tokenizes first
//! and then descends, so a malformed type string fails with a byte offset.

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::types::{DataType, DecimalWidth, EnumKind};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Integer(i64),
    StringLit(String),
    LParen,
    RParen,
    Comma,
    Equals,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{s}'"),
            Token::Integer(n) => format!("integer '{n}'"),
            Token::StringLit(s) => format!("string '{s}'"),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Equals => "'='".to_string(),
        }
    }
}

struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Tokenizer { input, bytes: input.as_bytes(), pos: 0 }
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, SchemaError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            let c = self.bytes[self.pos];
            let token = match c {
                b'(' => {
                    self.pos += 1;
                    Token::LParen
                }
                b')' => {
                    self.pos += 1;
                    Token::RParen
                }
                b',' => {
                    self.pos += 1;
                    Token::Comma
                }
                b'=' => {
                    self.pos += 1;
                    Token::Equals
                }
                b'\'' => self.read_string()?,
                b'0'..=b'9' => self.read_integer(),
                c if is_ident_start(c) => self.read_ident(),
                other => {
                    return Err(SchemaError::UnexpectedToken {
                        input: self.input.to_string(),
                        pos: start,
                        found: (other as char).to_string(),
                        expected: "identifier, integer, string, or punctuation".to_string(),
                    });
                }
            };
            tokens.push((token, start));
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        Token::Ident(self.input[start..self.pos].to_string())
    }

    fn read_integer(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let value: i64 = self.input[start..self.pos].parse().unwrap_or(i64::MAX);
        Token::Integer(value)
    }

    fn read_string(&mut self) -> Result<Token, SchemaError> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            if self.pos >= self.bytes.len() {
                return Err(SchemaError::UnexpectedEof(self.input.to_string()));
            }
            match self.bytes[self.pos] {
                b'\\' => {
                    self.pos += 1;
                    if self.pos >= self.bytes.len() {
                        return Err(SchemaError::UnexpectedEof(self.input.to_string()));
                    }
                    match self.bytes[self.pos] {
                        b'\\' => value.push('\\'),
                        b'\'' => value.push('\''),
                        other => {
                            return Err(SchemaError::UnexpectedToken {
                                input: self.input.to_string(),
                                pos: self.pos,
                                found: (other as char).to_string(),
                                expected: "'\\\\' or \"\\'\"".to_string(),
                            });
                        }
                    }
                    self.pos += 1;
                }
                b'\'' => {
                    self.pos += 1;
                    break;
                }
                _ => {
                    let rest = &self.input[self.pos..];
                    let ch = rest.chars().next().expect("non-empty slice");
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        let _ = start;
        Ok(Token::StringLit(value))
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_pos(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or(self.input.len())
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_ident(&mut self) -> Result<String, SchemaError> {
        match self.advance() {
            Some(Token::Ident(s)) => Ok(s),
            other => Err(self.unexpected(other, "a type name")),
        }
    }

    fn expect_lparen(&mut self) -> Result<(), SchemaError> {
        match self.advance() {
            Some(Token::LParen) => Ok(()),
            other => Err(self.unexpected(other, "'('")),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), SchemaError> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            other => Err(self.unexpected(other, "')'")),
        }
    }

    fn expect_comma(&mut self) -> Result<(), SchemaError> {
        match self.advance() {
            Some(Token::Comma) => Ok(()),
            other => Err(self.unexpected(other, "','")),
        }
    }

    fn expect_integer(&mut self) -> Result<i64, SchemaError> {
        match self.advance() {
            Some(Token::Integer(n)) => Ok(n),
            other => Err(self.unexpected(other, "an integer")),
        }
    }

    fn expect_string(&mut self) -> Result<String, SchemaError> {
        match self.advance() {
            Some(Token::StringLit(s)) => Ok(s),
            other => Err(self.unexpected(other, "a quoted string")),
        }
    }

    fn unexpected(&self, found: Option<Token>, expected: &str) -> SchemaError {
        match found {
            Some(token) => SchemaError::UnexpectedToken {
                input: self.input.to_string(),
                pos: self.pos.checked_sub(1).map(|_| self.peek_pos()).unwrap_or(0),
                found: token.describe(),
                expected: expected.to_string(),
            },
            None => SchemaError::UnexpectedEof(self.input.to_string()),
        }
    }

    fn parse_type(&mut self) -> Result<DataType, SchemaError> {
        let name = self.expect_ident()?;
        self.parse_type_by_name(&name)
    }

    fn parse_type_by_name(&mut self, name: &str) -> Result<DataType, SchemaError> {
        match name {
            "Int8" => Ok(DataType::Int8),
            "Int16" => Ok(DataType::Int16),
            "Int32" => Ok(DataType::Int32),
            "Int64" => Ok(DataType::Int64),
            "Int128" => Ok(DataType::Int128),
            "Int256" => Ok(DataType::Int256),
            "UInt8" => Ok(DataType::UInt8),
            "UInt16" => Ok(DataType::UInt16),
            "UInt32" => Ok(DataType::UInt32),
            "UInt64" => Ok(DataType::UInt64),
            "UInt128" => Ok(DataType::UInt128),
            "UInt256" => Ok(DataType::UInt256),
            "Float32" => Ok(DataType::Float32),
            "Float64" => Ok(DataType::Float64),
            "Bool" | "Boolean" => Ok(DataType::Bool),
            "String" => Ok(DataType::String),
            "Date" => Ok(DataType::Date),
            "Date32" => Ok(DataType::Date32),
            "UUID" => Ok(DataType::Uuid),
            "IPv4" => Ok(DataType::Ipv4),
            "IPv6" => Ok(DataType::Ipv6),
            "FixedString" => {
                self.expect_lparen()?;
                let n = self.expect_integer()?;
                self.expect_rparen()?;
                if n <= 0 {
                    return Err(SchemaError::invalid_params(
                        "FixedString",
                        "length must be positive",
                    ));
                }
                Ok(DataType::FixedString(n as usize))
            }
            "DateTime" => {
                if self.peek() != Some(&Token::LParen) {
                    return Ok(DataType::DateTime(None));
                }
                self.expect_lparen()?;
                let tz = self.expect_string()?;
                self.expect_rparen()?;
                Ok(DataType::DateTime(Some(tz)))
            }
            "DateTime64" => {
                self.expect_lparen()?;
                let scale = self.expect_integer()?;
                if !(0..=9).contains(&scale) {
                    return Err(SchemaError::invalid_params(
                        "DateTime64",
                        "scale must be between 0 and 9",
                    ));
                }
                let tz = if self.peek() == Some(&Token::Comma) {
                    self.expect_comma()?;
                    Some(self.expect_string()?)
                } else {
                    None
                };
                self.expect_rparen()?;
                Ok(DataType::DateTime64(scale as u8, tz))
            }
            "Decimal" => self.parse_decimal(),
            "Nullable" => {
                self.expect_lparen()?;
                let inner = self.parse_type()?;
                self.expect_rparen()?;
                Ok(DataType::Nullable(Box::new(inner)))
            }
            "Array" => {
                self.expect_lparen()?;
                let inner = self.parse_type()?;
                self.expect_rparen()?;
                Ok(DataType::Array(Box::new(inner)))
            }
            "Map" => {
                self.expect_lparen()?;
                let key = self.parse_type()?;
                self.expect_comma()?;
                let value = self.parse_type()?;
                self.expect_rparen()?;
                Ok(DataType::Map(Box::new(key), Box::new(value)))
            }
            "Tuple" => {
                self.expect_lparen()?;
                let mut elems = vec![self.parse_type()?];
                while self.peek() == Some(&Token::Comma) {
                    self.expect_comma()?;
                    elems.push(self.parse_type()?);
                }
                self.expect_rparen()?;
                Ok(DataType::Tuple(elems))
            }
            "LowCardinality" => {
                self.expect_lparen()?;
                let inner = self.parse_type()?;
                self.expect_rparen()?;
                Ok(DataType::LowCardinality(Box::new(inner)))
            }
            "Enum8" => self.parse_enum(EnumKind::Enum8),
            "Enum16" => self.parse_enum(EnumKind::Enum16),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }

    fn parse_decimal(&mut self) -> Result<DataType, SchemaError> {
        self.expect_lparen()?;
        let precision = self.expect_integer()?;
        self.expect_comma()?;
        let scale = self.expect_integer()?;
        self.expect_rparen()?;
        if !(1..=76).contains(&precision) {
            return Err(SchemaError::invalid_params(
                "Decimal",
                "precision must be between 1 and 76",
            ));
        }
        if scale < 0 || scale > precision {
            return Err(SchemaError::invalid_params(
                "Decimal",
                "scale must be between 0 and precision",
            ));
        }
        let width = DecimalWidth::for_precision(precision as u8)?;
        Ok(DataType::Decimal(precision as u8, scale as u8, width))
    }

    fn parse_enum(&mut self, kind: EnumKind) -> Result<DataType, SchemaError> {
        self.expect_lparen()?;
        let mut values = BTreeMap::new();
        loop {
            let label = self.expect_string()?;
            self.advance_if_equals()?;
            let code = self.expect_integer()?;
            let in_range = match kind {
                EnumKind::Enum8 => code >= i8::MIN as i64 && code <= i8::MAX as i64,
                EnumKind::Enum16 => code >= i16::MIN as i64 && code <= i16::MAX as i64,
            };
            if !in_range {
                return Err(SchemaError::invalid_params(
                    kind.name(),
                    match kind {
                        EnumKind::Enum8 => "value out of range for an 8-bit code",
                        EnumKind::Enum16 => "value out of range for a 16-bit code",
                    },
                ));
            }
            values.insert(code as i16, label);
            if self.peek() == Some(&Token::Comma) {
                self.expect_comma()?;
            } else {
                break;
            }
        }
        self.expect_rparen()?;
        Ok(DataType::Enum(kind, values))
    }

    fn advance_if_equals(&mut self) -> Result<(), SchemaError> {
        match self.advance() {
            Some(Token::Equals) => Ok(()),
            other => Err(self.unexpected(other, "'='")),
        }
    }
}

/// Parses a full type string, rejecting any trailing, unconsumed tokens.
pub fn parse_type(input: &str) -> Result<DataType, SchemaError> {
    let tokens = Tokenizer::new(input).tokenize()?;
    let mut parser = Parser { input, tokens, pos: 0 };
    let ty = parser.parse_type()?;
    if parser.pos != parser.tokens.len() {
        let trailing_pos = parser.peek_pos();
        return Err(SchemaError::TrailingData(input[trailing_pos..].to_string()));
    }
    ty.validate()?;
    Ok(ty)
}
