//! Fixed-point decimal values.
//!
//! A `Decimal(P, S)` column never touches a binary float on the wire: it is
//! a signed integer coefficient of a width chosen from `P` (`DecimalWidth`,
//! from `rowbinary-types`) representing `coefficient * 10^-S`. This module
//! keeps that coefficient as an integer end to end; the only place a float
//! enters is [`DecimalValue::from_f64`], which quantizes with round-half-to-
//! even and rejects values that would overflow the declared width.

use std::fmt;

use rowbinary_types::DecimalWidth;

use crate::error::Error;
use crate::int256::Int256;

/// A `Decimal(P, S)` value: an integer coefficient at a given scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalValue {
    I32 { coefficient: i32, scale: u8 },
    I64 { coefficient: i64, scale: u8 },
    I128 { coefficient: i128, scale: u8 },
    I256 { coefficient: Int256, scale: u8 },
}

impl DecimalValue {
    pub fn scale(&self) -> u8 {
        match self {
            DecimalValue::I32 { scale, .. }
            | DecimalValue::I64 { scale, .. }
            | DecimalValue::I128 { scale, .. }
            | DecimalValue::I256 { scale, .. } => *scale,
        }
    }

    pub fn width(&self) -> DecimalWidth {
        match self {
            DecimalValue::I32 { .. } => DecimalWidth::Bits32,
            DecimalValue::I64 { .. } => DecimalWidth::Bits64,
            DecimalValue::I128 { .. } => DecimalWidth::Bits128,
            DecimalValue::I256 { .. } => DecimalWidth::Bits256,
        }
    }

    /// Builds a value directly from an already-scaled integer coefficient,
    /// narrowing it to `width` and erroring if it doesn't fit.
    pub fn from_coefficient(coefficient: i128, scale: u8, width: DecimalWidth) -> Result<Self, Error> {
        match width {
            DecimalWidth::Bits32 => i32::try_from(coefficient)
                .map(|coefficient| DecimalValue::I32 { coefficient, scale })
                .map_err(|_| Error::validation(0, format!("Decimal32 coefficient {coefficient} out of range"))),
            DecimalWidth::Bits64 => i64::try_from(coefficient)
                .map(|coefficient| DecimalValue::I64 { coefficient, scale })
                .map_err(|_| Error::validation(0, format!("Decimal64 coefficient {coefficient} out of range"))),
            DecimalWidth::Bits128 => Ok(DecimalValue::I128 { coefficient, scale }),
            DecimalWidth::Bits256 => Ok(DecimalValue::I256 { coefficient: Int256::from(coefficient), scale }),
        }
    }

    /// Quantizes a binary float to `scale` fractional digits using
    /// round-half-to-even, then checks the result fits in `precision`
    /// decimal digits for the chosen width.
    pub fn from_f64(value: f64, precision: u8, scale: u8) -> Result<Self, Error> {
        if !value.is_finite() {
            return Err(Error::validation(0, "Decimal value must be finite"));
        }
        let width = DecimalWidth::for_precision(precision).map_err(Error::Schema)?;
        let scaled = (value * 10f64.powi(scale as i32)).round_ties_even();
        let max_abs = 10f64.powi(precision as i32);
        if scaled.abs() >= max_abs {
            return Err(Error::validation(
                0,
                format!("Decimal overflow: {value} does not fit in precision {precision}, scale {scale}"),
            ));
        }
        Self::from_coefficient(scaled as i128, scale, width)
    }

    /// An approximate `f64` view of this value; decimals are exact, this
    /// conversion is not (same caveat as any decimal-to-binary-float cast).
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (text, scale) = match self {
            DecimalValue::I32 { coefficient, scale } => (coefficient.to_string(), *scale),
            DecimalValue::I64 { coefficient, scale } => (coefficient.to_string(), *scale),
            DecimalValue::I128 { coefficient, scale } => (coefficient.to_string(), *scale),
            DecimalValue::I256 { coefficient, scale } => (coefficient.to_string(), *scale),
        };
        f.write_str(&format_scaled(&text, scale))
    }
}

fn format_scaled(text: &str, scale: u8) -> String {
    let negative = text.starts_with('-');
    let digits = if negative { &text[1..] } else { text };
    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits.to_string()
    };
    let point = padded.len() - scale;
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&padded[..point]);
    if scale > 0 {
        out.push('.');
        out.push_str(&padded[point..]);
    }
    out
}
