//! Generic position and offset arithmetic.
//!
//! Streams are parameterized by the numeric type used for positions, so the
//! same buffered and bit-level code serves a 32-bit in-memory buffer, a
//! 64-bit file or a format that needs 128-bit offsets.
//!
//! A position is an opaque, totally ordered location. An offset is the
//! unsigned distance between two positions:
//!
//! ```text
//! Position - Position = Offset
//! Position + Offset   = Position
//! ```
//!
//! All arithmetic is checked. Overflow is reported as
//! [`StreamError::Overflow`], never wrapped.
//!
//! # Example
//!
//! ```
//! use oxistream_core::position::{StreamPosition, advance, distance};
//!
//! let start = <u32 as StreamPosition>::ZERO;
//! let end = advance(start, 10u32, "example").unwrap();
//! assert_eq!(distance(end, start, "example").unwrap(), 10);
//! assert!(advance(u32::MAX, 1u32, "example").is_err());
//! ```

use crate::error::{Result, StreamError};
use std::fmt::{Debug, Display};

/// An unsigned distance between two stream positions.
pub trait StreamOffset: Copy + Ord + Debug + Display + Send + Sync + 'static {
    /// The empty distance.
    const ZERO: Self;
    /// The largest representable distance.
    const MAX: Self;

    /// Add two offsets, returning `None` on overflow.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Subtract two offsets, returning `None` if `rhs > self`.
    fn checked_sub(self, rhs: Self) -> Option<Self>;

    /// Convert a byte count into an offset, returning `None` if it does not fit.
    fn from_usize(count: usize) -> Option<Self>;

    /// Convert into a byte count, clamping at `usize::MAX`.
    fn saturating_to_usize(self) -> usize;

    /// Widen into a `u128`.
    fn to_u128(self) -> u128;

    /// Narrow from a `u128`, returning `None` if it does not fit.
    fn from_u128(value: u128) -> Option<Self>;
}

/// A totally ordered location within a stream.
pub trait StreamPosition: Copy + Ord + Debug + Display + Send + Sync + 'static {
    /// The distance type between two positions.
    type Offset: StreamOffset;

    /// The position of the first byte of every stream.
    const ZERO: Self;

    /// `self + offset`, returning `None` on overflow.
    fn checked_add_offset(self, offset: Self::Offset) -> Option<Self>;

    /// `self - offset`, returning `None` if the result precedes the origin.
    fn checked_sub_offset(self, offset: Self::Offset) -> Option<Self>;

    /// `self - origin`, returning `None` if `origin > self`.
    fn checked_offset_from(self, origin: Self) -> Option<Self::Offset>;
}

/// Offset type associated with a position type.
pub type OffsetOf<P> = <P as StreamPosition>::Offset;

macro_rules! impl_unsigned {
    ($($t:ty),* $(,)?) => {
        $(
            impl StreamOffset for $t {
                const ZERO: Self = 0;
                const MAX: Self = <$t>::MAX;

                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }

                #[inline]
                fn checked_sub(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_sub(self, rhs)
                }

                #[inline]
                fn from_usize(count: usize) -> Option<Self> {
                    <$t>::try_from(count).ok()
                }

                #[inline]
                fn saturating_to_usize(self) -> usize {
                    usize::try_from(self).unwrap_or(usize::MAX)
                }

                #[inline]
                fn to_u128(self) -> u128 {
                    self as u128
                }

                #[inline]
                fn from_u128(value: u128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }

            impl StreamPosition for $t {
                type Offset = $t;
                const ZERO: Self = 0;

                #[inline]
                fn checked_add_offset(self, offset: Self::Offset) -> Option<Self> {
                    <$t>::checked_add(self, offset)
                }

                #[inline]
                fn checked_sub_offset(self, offset: Self::Offset) -> Option<Self> {
                    <$t>::checked_sub(self, offset)
                }

                #[inline]
                fn checked_offset_from(self, origin: Self) -> Option<Self::Offset> {
                    <$t>::checked_sub(self, origin)
                }
            }
        )*
    };
}

impl_unsigned!(u16, u32, u64, u128, usize);

/// `position + offset`, failing with [`StreamError::Overflow`].
#[inline]
pub fn advance<P: StreamPosition>(position: P, offset: P::Offset, operation: &str) -> Result<P> {
    position
        .checked_add_offset(offset)
        .ok_or_else(|| StreamError::overflow(operation))
}

/// `position - offset`, failing with [`StreamError::Overflow`].
#[inline]
pub fn retreat<P: StreamPosition>(position: P, offset: P::Offset, operation: &str) -> Result<P> {
    position
        .checked_sub_offset(offset)
        .ok_or_else(|| StreamError::overflow(operation))
}

/// `position - origin`, failing with [`StreamError::Overflow`].
#[inline]
pub fn distance<P: StreamPosition>(position: P, origin: P, operation: &str) -> Result<P::Offset> {
    position
        .checked_offset_from(origin)
        .ok_or_else(|| StreamError::overflow(operation))
}

/// Convert a byte count into an offset, failing with [`StreamError::Overflow`].
#[inline]
pub fn offset_from_len<O: StreamOffset>(count: usize, operation: &str) -> Result<O> {
    O::from_usize(count).ok_or_else(|| StreamError::overflow(operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<P: StreamPosition>(start: P, off: P::Offset) {
        let end = advance(start, off, "test").unwrap();
        assert_eq!(distance(end, start, "test").unwrap(), off);
        assert_eq!(retreat(end, off, "test").unwrap(), start);
    }

    #[test]
    fn test_generic_arithmetic() {
        roundtrip(5u16, 7u16);
        roundtrip(5u32, 700u32);
        roundtrip(1u64 << 40, 3u64);
        roundtrip(u128::from(u64::MAX), u128::from(u64::MAX));
        roundtrip(0usize, 42usize);
    }

    #[test]
    fn test_overflow_detected() {
        let err = advance(u32::MAX, 1u32, "seek").unwrap_err();
        assert!(matches!(err, StreamError::Overflow { ref operation } if operation == "seek"));
        assert!(distance(1u64, 2u64, "len").is_err());
        assert!(retreat(0u16, 1u16, "pos").is_err());
    }

    #[test]
    fn test_offset_conversions() {
        assert_eq!(<u16 as StreamOffset>::from_usize(70_000), None);
        assert_eq!(<u32 as StreamOffset>::from_usize(70_000), Some(70_000));
        assert_eq!(u128::MAX.saturating_to_usize(), usize::MAX);
        assert_eq!(300u16.saturating_to_usize(), 300);
        assert!(offset_from_len::<u16>(1 << 20, "write").is_err());
        assert_eq!(<u64 as StreamOffset>::MAX, u64::MAX);
        assert_eq!(<u32 as StreamOffset>::from_u128(1 << 40), None);
        assert_eq!(<u64 as StreamOffset>::from_u128(1 << 40), Some(1 << 40));
    }

    #[test]
    fn test_zero_is_start() {
        assert_eq!(<u32 as StreamPosition>::ZERO, 0);
        assert_eq!(<u128 as StreamPosition>::ZERO, 0);
    }
}
