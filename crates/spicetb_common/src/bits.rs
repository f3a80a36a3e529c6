//! Fixed-width bit vectors and their binary/hex text codecs.

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits packed per storage word.
const BITS_PER_WORD: u32 = 64;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Returns the number of hex digits needed to print `width` bits.
pub fn hex_digits_for(width: u32) -> usize {
    width.div_ceil(4) as usize
}

/// A fixed-width vector of two-state bits.
///
/// Bit 0 is the least significant bit. The width is carried as a value and
/// checked at runtime wherever two widths must agree.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVec {
    width: u32,
    data: Vec<u64>,
}

impl BitVec {
    /// Creates a new `BitVec` of the given width with every bit cleared.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Returns the number of bits in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.data[(index / BITS_PER_WORD) as usize];
        (word >> (index % BITS_PER_WORD)) & 1 != 0
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: bool) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = &mut self.data[(index / BITS_PER_WORD) as usize];
        let mask = 1u64 << (index % BITS_PER_WORD);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Creates a `BitVec` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, true);
            }
        }
        v
    }

    /// Converts to a `u64`, or `None` if the width exceeds 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        Some(self.data.first().copied().unwrap_or(0))
    }

    /// Creates a `BitVec` from a sequence of bits, first item being bit 0.
    pub fn from_bools<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let bits: Vec<bool> = bits.into_iter().collect();
        let mut v = Self::new(bits.len() as u32);
        for (i, bit) in bits.into_iter().enumerate() {
            v.set(i as u32, bit);
        }
        v
    }

    /// Iterates over the bits from bit 0 upwards.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width).map(move |i| self.get(i))
    }

    /// Encodes as lowercase hex, most significant nibble first, zero padded
    /// to [`hex_digits_for`] digits.
    pub fn to_hex(&self) -> String {
        let digits = hex_digits_for(self.width);
        let mut out = vec![b'0'; digits];
        for (nib_idx, slot) in out.iter_mut().rev().enumerate() {
            let mut nibble = 0usize;
            for bit in 0..4 {
                let index = nib_idx as u32 * 4 + bit;
                if index < self.width && self.get(index) {
                    nibble |= 1 << bit;
                }
            }
            *slot = HEX_DIGITS[nibble];
        }
        out.into_iter().map(char::from).collect()
    }

    /// Encodes as `width` binary digits, most significant bit first.
    pub fn to_binary(&self) -> String {
        (0..self.width)
            .rev()
            .map(|i| if self.get(i) { '1' } else { '0' })
            .collect()
    }

    /// Decodes a hex string of exactly [`hex_digits_for`]`(width)` digits.
    ///
    /// Upper and lower case digits are accepted. Bits of the top nibble that
    /// lie beyond `width` are dropped.
    pub fn from_hex(s: &str, width: u32) -> Result<Self, FormatError> {
        let expected = hex_digits_for(width);
        let actual = s.chars().count();
        if actual != expected {
            return Err(FormatError::Length { expected, actual });
        }
        let mut v = Self::new(width);
        for (nib_idx, c) in s.chars().rev().enumerate() {
            let nibble = c
                .to_digit(16)
                .ok_or(FormatError::InvalidDigit { digit: c, radix: 16 })?;
            for bit in 0..4 {
                let index = nib_idx as u32 * 4 + bit;
                if index < width && nibble & (1 << bit) != 0 {
                    v.set(index, true);
                }
            }
        }
        Ok(v)
    }

    /// Decodes a binary string of exactly `width` digits, MSB first.
    pub fn from_binary(s: &str, width: u32) -> Result<Self, FormatError> {
        let expected = width as usize;
        let actual = s.chars().count();
        if actual != expected {
            return Err(FormatError::Length { expected, actual });
        }
        let mut v = Self::new(width);
        for (i, c) in s.chars().rev().enumerate() {
            match c {
                '0' => {}
                '1' => v.set(i as u32, true),
                _ => return Err(FormatError::InvalidDigit { digit: c, radix: 2 }),
            }
        }
        Ok(v)
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary())
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec({self})")
    }
}

/// Returns the number of u64 words needed to store `width` bits.
fn word_count(width: u32) -> usize {
    width.div_ceil(BITS_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digit_counts() {
        assert_eq!(hex_digits_for(0), 0);
        assert_eq!(hex_digits_for(1), 1);
        assert_eq!(hex_digits_for(4), 1);
        assert_eq!(hex_digits_for(5), 2);
        assert_eq!(hex_digits_for(8), 2);
        assert_eq!(hex_digits_for(9), 3);
        assert_eq!(hex_digits_for(64), 16);
        assert_eq!(hex_digits_for(65), 17);
    }

    #[test]
    fn set_get() {
        let mut v = BitVec::new(4);
        v.set(1, true);
        v.set(3, true);
        assert!(!v.get(0));
        assert!(v.get(1));
        assert!(!v.get(2));
        assert!(v.get(3));
        v.set(3, false);
        assert!(!v.get(3));
    }

    #[test]
    fn to_hex_pads_and_orders_nibbles() {
        assert_eq!(BitVec::from_u64(0xa5, 8).to_hex(), "a5");
        assert_eq!(BitVec::from_u64(0x3, 12).to_hex(), "003");
        assert_eq!(BitVec::from_u64(0x1f, 5).to_hex(), "1f");
        assert_eq!(BitVec::from_u64(1, 1).to_hex(), "1");
    }

    #[test]
    fn to_binary_msb_first() {
        let v = BitVec::from_u64(0b0110, 4);
        assert_eq!(v.to_binary(), "0110");
        assert_eq!(format!("{v}"), "0110");
    }

    #[test]
    fn from_hex_mixed_case() {
        let v = BitVec::from_hex("Ab", 8).unwrap();
        assert_eq!(v.to_u64(), Some(0xab));
    }

    #[test]
    fn from_hex_drops_bits_beyond_width() {
        let v = BitVec::from_hex("ff", 5).unwrap();
        assert_eq!(v.to_u64(), Some(0x1f));
    }

    #[test]
    fn from_hex_wrong_length() {
        let err = BitVec::from_hex("abc", 8).unwrap_err();
        assert_eq!(
            err,
            FormatError::Length {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn from_hex_invalid_digit() {
        let err = BitVec::from_hex("g0", 8).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidDigit {
                digit: 'g',
                radix: 16
            }
        );
    }

    #[test]
    fn from_binary_decodes_msb_first() {
        let v = BitVec::from_binary("1000", 4).unwrap();
        assert!(v.get(3));
        assert!(!v.get(0));
    }

    #[test]
    fn from_binary_errors() {
        assert_eq!(
            BitVec::from_binary("101", 4).unwrap_err(),
            FormatError::Length {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            BitVec::from_binary("1021", 4).unwrap_err(),
            FormatError::InvalidDigit {
                digit: '2',
                radix: 2
            }
        );
    }

    #[test]
    fn roundtrip_across_widths() {
        for width in 1..=70u32 {
            let bits = BitVec::from_bools((0..width).map(|i| (i * 7 + width) % 3 == 0));
            assert_eq!(BitVec::from_hex(&bits.to_hex(), width).unwrap(), bits);
            assert_eq!(BitVec::from_binary(&bits.to_binary(), width).unwrap(), bits);
        }
    }

    #[test]
    fn to_u64_limits() {
        assert_eq!(BitVec::from_u64(u64::MAX, 64).to_u64(), Some(u64::MAX));
        assert_eq!(BitVec::new(65).to_u64(), None);
        assert_eq!(BitVec::from_u64(0xff, 4).to_u64(), Some(0xf));
    }

    #[test]
    fn iter_from_lsb() {
        let v = BitVec::from_u64(0b101, 3);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![true, false, true]);
    }

    #[test]
    fn serde_roundtrip() {
        let v = BitVec::from_hex("dead", 16).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: BitVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
