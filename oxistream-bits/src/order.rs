//! Mapping between a bit's place in the stream and its place in a byte.

use std::fmt;

/// The order in which bits are packed into each byte.
///
/// Fixed when a reader or writer is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BitOrder {
    /// The first bit of a byte is bit 7 (`0x80`).
    #[default]
    MsbFirst,
    /// The first bit of a byte is bit 0 (`0x01`).
    LsbFirst,
}

impl BitOrder {
    /// Shift of the `index`-th bit of a byte, counted in stream order.
    #[inline]
    fn shift(self, index: u8) -> u8 {
        debug_assert!(index < 8);
        match self {
            BitOrder::MsbFirst => 7 - index,
            BitOrder::LsbFirst => index,
        }
    }

    /// Extract the `index`-th bit (stream order) of `byte`.
    #[inline]
    pub fn bit_at(self, byte: u8, index: u8) -> bool {
        (byte >> self.shift(index)) & 1 == 1
    }

    /// The byte with only the `index`-th bit (stream order) set to `bit`.
    #[inline]
    pub fn place(self, bit: bool, index: u8) -> u8 {
        (bit as u8) << self.shift(index)
    }
}

impl fmt::Display for BitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitOrder::MsbFirst => write!(f, "msb-first"),
            BitOrder::LsbFirst => write!(f, "lsb-first"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_at() {
        // 0b1011_0000
        assert!(BitOrder::MsbFirst.bit_at(0xB0, 0));
        assert!(!BitOrder::MsbFirst.bit_at(0xB0, 1));
        assert!(BitOrder::MsbFirst.bit_at(0xB0, 3));
        assert!(!BitOrder::MsbFirst.bit_at(0xB0, 7));

        assert!(BitOrder::LsbFirst.bit_at(0x0D, 0));
        assert!(!BitOrder::LsbFirst.bit_at(0x0D, 1));
        assert!(BitOrder::LsbFirst.bit_at(0x0D, 3));
    }

    #[test]
    fn test_place_is_inverse() {
        for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
            for byte in [0x00u8, 0x5A, 0xB0, 0xFF] {
                let rebuilt = (0..8).fold(0u8, |acc, i| acc | order.place(order.bit_at(byte, i), i));
                assert_eq!(rebuilt, byte, "{}", order);
            }
        }
    }

    #[test]
    fn test_default_is_msb_first() {
        assert_eq!(BitOrder::default(), BitOrder::MsbFirst);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BitOrder::LsbFirst).unwrap();
        assert_eq!(json, r#""lsb_first""#);
        let back: BitOrder = serde_json::from_str(r#""msb_first""#).unwrap();
        assert_eq!(back, BitOrder::MsbFirst);
        assert!(serde_json::from_str::<BitOrder>(r#""middle""#).is_err());
    }
}
