//! 256-bit integers, stored as little-endian byte arrays.
//!
//! These exist to round-trip `UInt256`/`Int256` columns losslessly; they are
//! not general-purpose big integers. No arithmetic, no radix formatting, no
//! parsing from strings — just widening/narrowing conversions to the native
//! integer types and a `Display` impl for diagnostics.

use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// A 256-bit unsigned integer, little-endian byte storage.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct UInt256 {
    le_bytes: [u8; 32],
}

impl UInt256 {
    pub const MIN: Self = Self::ZERO;
    pub const ZERO: Self = Self { le_bytes: [0; 32] };
    pub const ONE: Self = Self {
        le_bytes: const {
            let mut b = [0u8; 32];
            b[0] = 1;
            b
        },
    };
    pub const MAX: Self = Self { le_bytes: [0xFF; 32] };

    #[inline]
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self { le_bytes: bytes }
    }

    #[inline]
    pub const fn to_le_bytes(self) -> [u8; 32] {
        self.le_bytes
    }

    #[inline]
    fn widen_from_le_bytes(bytes: &[u8]) -> Self {
        Self::from_le_bytes(widen_from_le_bytes(bytes))
    }

    #[inline]
    fn narrow_to_le_bytes<const N: usize>(self) -> Option<[u8; N]> {
        let (le_bytes, remainder) = self.le_bytes.split_first_chunk()?;
        if remainder.iter().all(|byte| *byte == 0) {
            Some(*le_bytes)
        } else {
            None
        }
    }

    #[inline]
    fn as_bnum(&self) -> bnum::types::U256 {
        bnum::types::U256::from_le_slice(&self.le_bytes).expect("32-byte slice always converts")
    }
}

impl PartialOrd for UInt256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UInt256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.le_bytes.iter().rev().cmp(other.le_bytes.iter().rev())
    }
}

impl Debug for UInt256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UInt256").field(&self.as_bnum()).finish()
    }
}

impl Display for UInt256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.as_bnum(), f)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("`UInt256` value out of range for the target type")]
pub struct TryFromUInt256Error(());

macro_rules! impl_uint256_from {
    ($($ty:ty),*) => {$(
        impl From<$ty> for UInt256 {
            #[inline]
            fn from(val: $ty) -> Self {
                Self::widen_from_le_bytes(&val.to_le_bytes())
            }
        }
    )*}
}

impl_uint256_from! { u8, u16, u32, u64, u128 }

macro_rules! impl_try_from_uint256 {
    ($($ty:ty),*) => {$(
        impl TryFrom<UInt256> for $ty {
            type Error = TryFromUInt256Error;

            fn try_from(value: UInt256) -> Result<Self, Self::Error> {
                Ok(<$ty>::from_le_bytes(value.narrow_to_le_bytes().ok_or(TryFromUInt256Error(()))?))
            }
        }
    )*};
}

impl_try_from_uint256! { u8, u16, u32, u64, u128 }

/// A 256-bit signed integer in two's complement, little-endian byte storage.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Int256 {
    le_bytes: [u8; 32],
}

const SIGN_BIT: u8 = 0b1000_0000;

impl Int256 {
    pub const MIN: Self = Self {
        le_bytes: const {
            let mut b = [0u8; 32];
            b[31] = SIGN_BIT;
            b
        },
    };
    pub const MINUS_ONE: Self = Self { le_bytes: [0xFF; 32] };
    pub const ZERO: Self = Self { le_bytes: [0u8; 32] };
    pub const ONE: Self = Self {
        le_bytes: const {
            let mut b = [0u8; 32];
            b[0] = 1;
            b
        },
    };
    pub const MAX: Self = Self {
        le_bytes: const {
            let mut b = [0xFF; 32];
            b[31] = 0x7F;
            b
        },
    };

    #[inline]
    fn widen_from_le_bytes(bytes: &[u8]) -> Self {
        Self { le_bytes: widen_from_le_bytes(bytes) }
    }

    #[inline]
    fn sign_extend_from_le_bytes(bytes: &[u8]) -> Self {
        let msb = bytes.last().expect("non-empty slice");
        let fill = if msb & SIGN_BIT != 0 { 0xFFu8 } else { 0 };
        let mut le_bytes = [fill; 32];
        le_bytes[..bytes.len()].copy_from_slice(bytes);
        Self { le_bytes }
    }

    #[inline]
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self { le_bytes: bytes }
    }

    #[inline]
    pub fn to_le_bytes(self) -> [u8; 32] {
        self.le_bytes
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.le_bytes[31] & SIGN_BIT != 0
    }

    #[inline]
    fn narrow_to_le_bytes<const N: usize>(self) -> Option<[u8; N]> {
        let (le_bytes, remainder) = self.le_bytes.split_first_chunk()?;
        let all_zeroes = remainder.iter().all(|&b| b == 0);
        let all_ones = remainder.iter().all(|&b| b == 0xFF);
        if all_zeroes || all_ones {
            Some(*le_bytes)
        } else {
            None
        }
    }

    #[inline]
    fn as_bnum(&self) -> bnum::types::I256 {
        bnum::types::I256::from_le_slice(&self.le_bytes).expect("32-byte slice always converts")
    }
}

impl PartialOrd for Int256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => (),
        }
        self.le_bytes.iter().rev().cmp(other.le_bytes.iter().rev())
    }
}

impl Debug for Int256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Int256").field(&self.as_bnum()).finish()
    }
}

impl Display for Int256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.as_bnum(), f)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("`Int256` value out of range for the target type")]
pub struct TryFromInt256Error(());

macro_rules! impl_int256_from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Int256 {
            fn from(val: $ty) -> Self {
                Self::sign_extend_from_le_bytes(&val.to_le_bytes())
            }
        }
    )*};
}

impl_int256_from_signed! { i8, i16, i32, i64, i128 }

macro_rules! impl_int256_from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Int256 {
            fn from(val: $ty) -> Self {
                Self::widen_from_le_bytes(&val.to_le_bytes())
            }
        }
    )*};
}

impl_int256_from_unsigned! { u8, u16, u32, u64, u128 }

macro_rules! impl_try_from_int256_signed {
    ($($ty:ty),*) => {$(
        impl TryFrom<Int256> for $ty {
            type Error = TryFromInt256Error;

            fn try_from(value: Int256) -> Result<Self, Self::Error> {
                Ok(<$ty>::from_le_bytes(value.narrow_to_le_bytes().ok_or(TryFromInt256Error(()))?))
            }
        }
    )*};
}

impl_try_from_int256_signed! { i8, i16, i32, i64, i128 }

#[inline]
fn widen_from_le_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut le_bytes = [0u8; 32];
    le_bytes[..bytes.len()].copy_from_slice(bytes);
    le_bytes
}

#[cfg(test)]
mod tests {
    use super::{Int256, UInt256};

    #[test]
    fn uint_256_consts() {
        assert_eq!(UInt256::MIN, UInt256::from(0u32));
        assert_eq!(UInt256::MAX, UInt256::from_le_bytes([0xFF; 32]));
        assert!(UInt256::MIN < UInt256::MAX);
        assert_eq!(UInt256::ONE.to_string(), "1");
        assert_eq!(
            UInt256::MAX.to_string(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn int_256_consts() {
        assert_eq!(Int256::ZERO, Int256::from(0u32));
        assert!(Int256::MIN < Int256::MINUS_ONE);
        assert!(Int256::MINUS_ONE < Int256::ZERO);
        assert!(Int256::ZERO < Int256::ONE);
        assert!(Int256::ONE < Int256::MAX);
        assert_eq!(
            Int256::MIN.to_string(),
            "-57896044618658097711785492504343953926634992332820282019728792003956564819968"
        );
        assert_eq!(Int256::MINUS_ONE.to_string(), "-1");
    }

    #[test]
    fn uint_256_round_trips_through_native_widths() {
        let values = [0u64, 1, 1234, 1234567890, 11223344556677889900, u64::MAX];
        for value in values {
            let wide = UInt256::from(value);
            assert_eq!(u64::try_from(wide).unwrap(), value);
        }
    }

    #[test]
    fn int_256_round_trips_negative_values() {
        let values = [i64::MIN, -112233445566778899, -1, 0, 1, i64::MAX];
        for value in values {
            let wide = Int256::from(value);
            assert_eq!(i64::try_from(wide).unwrap(), value);
        }
    }

    #[test]
    fn narrowing_rejects_overflow() {
        assert!(u8::try_from(UInt256::from(256u32)).is_err());
        assert!(i8::try_from(Int256::from(200u32)).is_err());
    }
}
