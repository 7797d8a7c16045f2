//! An owned, ordered sequence of bits.

use oxistream_core::error::{Result, StreamError};
use std::fmt;
use std::str::FromStr;

/// An ordered sequence of bits, first bit first.
///
/// Displayed and parsed as a string of `0`/`1` digits:
///
/// ```
/// use oxistream_bits::Bits;
///
/// let bits: Bits = "1011".parse().unwrap();
/// assert_eq!(bits.len(), 4);
/// assert_eq!(bits.to_u64(), Some(0b1011));
/// assert_eq!(bits.to_string(), "1011");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bits {
    bits: Vec<bool>,
}

impl Bits {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty sequence with room for `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    /// The low `count` bits of `value`, most significant first.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidArgument` if `count` exceeds 64.
    pub fn from_u64(value: u64, count: u8) -> Result<Self> {
        if count > 64 {
            return Err(StreamError::invalid_argument(format!(
                "cannot take {} bits from a 64-bit value",
                count
            )));
        }
        Ok((0..count).rev().map(|i| (value >> i) & 1 == 1).collect())
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the sequence holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The bit at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Append a bit.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Iterate over the bits in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// The bits as a slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Interpret the sequence as an unsigned number, first bit most
    /// significant. `None` if longer than 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.bits.len() > 64 {
            return None;
        }
        Some(self.iter().fold(0u64, |acc, bit| (acc << 1) | bit as u64))
    }
}

impl From<Vec<bool>> for Bits {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl From<Bits> for Vec<bool> {
    fn from(bits: Bits) -> Self {
        bits.bits
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl Extend<bool> for Bits {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        self.bits.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Bits {
    type Item = bool;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, bool>>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.iter().copied()
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Bits {
    type Err = StreamError;

    /// Parse `0`/`1` digits. `_` and whitespace are ignored as separators.
    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .filter(|c| *c != '_' && !c.is_whitespace())
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(StreamError::invalid_argument(format!(
                    "invalid bit digit '{}'",
                    other
                ))),
            })
            .collect()
    }
}
