//! Packed 4-state bit vectors for literals that cannot be held in a `u64`.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A fixed-width vector of [`Logic`] values, bit 0 being the least significant.
///
/// Values are packed two bits each, 32 per `u64` word.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    data: Vec<u64>,
}

const VALUES_PER_WORD: u32 = 32;

fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

impl LogicVec {
    /// Creates an all-zero vector.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Reads bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "bit {index} out of range for width {}",
            self.width
        );
        let word = self.data[(index / VALUES_PER_WORD) as usize];
        Logic::from_bits(word >> ((index % VALUES_PER_WORD) * 2))
    }

    /// Writes bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "bit {index} out of range for width {}",
            self.width
        );
        let slot = &mut self.data[(index / VALUES_PER_WORD) as usize];
        let shift = (index % VALUES_PER_WORD) * 2;
        *slot = (*slot & !(0b11u64 << shift)) | ((value as u64) << shift);
    }

    /// Builds a vector from the low `width` bits of `value`; bits above 64 are zero.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            v.set(i, Logic::from_bool((value >> i) & 1 != 0));
        }
        v
    }

    /// Returns the numeric value when every bit is known and the width fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        (0..self.width).try_fold(0u64, |acc, i| match self.get(i) {
            Logic::Zero => Some(acc),
            Logic::One => Some(acc | (1 << i)),
            Logic::X | Logic::Z => None,
        })
    }

    /// Parses a binary digit string, most significant bit first.
    ///
    /// `_` separators are skipped. `x`, `z` and `?` keep their position as
    /// unknown or high-impedance bits. Returns `None` on any other character
    /// or when no digits remain.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let digits = s
            .chars()
            .filter(|c| *c != '_')
            .map(Logic::from_char)
            .collect::<Option<Vec<_>>>()?;
        if digits.is_empty() {
            return None;
        }
        let mut v = Self::new(digits.len() as u32);
        for (i, bit) in digits.into_iter().rev().enumerate() {
            v.set(i as u32, bit);
        }
        Some(v)
    }

    /// Returns `true` if any bit is `X` or `Z`.
    pub fn has_unknown(&self) -> bool {
        (0..self.width).any(|i| !self.get(i).is_known())
    }

    /// Returns a copy truncated or zero-extended to `width` bits.
    pub fn resized(&self, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(self.width) {
            v.set(i, self.get(i));
        }
        v
    }

    /// Renders the radix digit covering bits `lsb..lsb + bits_per_digit`.
    ///
    /// Bits past the vector width count as zero. A group whose bits are all
    /// known yields an uppercase digit; a group that is entirely `X` or
    /// entirely `Z` yields `x` or `z`. Any other mix cannot be written as a
    /// single digit and yields `None`.
    pub fn digit(&self, lsb: u32, bits_per_digit: u32) -> Option<char> {
        let group: Vec<Logic> = (lsb..lsb + bits_per_digit)
            .map(|i| {
                if i < self.width {
                    self.get(i)
                } else {
                    Logic::Zero
                }
            })
            .collect();
        if group.iter().all(|b| b.is_known()) {
            let value = group
                .iter()
                .enumerate()
                .fold(0u32, |acc, (i, b)| acc | (u32::from(*b == Logic::One) << i));
            return char::from_digit(value, 1 << bits_per_digit).map(|c| c.to_ascii_uppercase());
        }
        let in_range: Vec<Logic> = group
            .into_iter()
            .take(self.width.saturating_sub(lsb) as usize)
            .collect();
        match in_range.first() {
            Some(first) if !first.is_known() && in_range.iter().all(|b| b == first) => {
                Some(first.to_char())
            }
            _ => None,
        }
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({}'b{self})", self.width)
    }
}

impl Not for &LogicVec {
    type Output = LogicVec;

    fn not(self) -> LogicVec {
        let mut out = LogicVec::new(self.width);
        for i in 0..self.width {
            out.set(i, !self.get(i));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_string_matches_integer_parse() {
        for s in ["0", "1", "1010", "11111111", "100000000000000000001"] {
            let v = LogicVec::from_binary_str(s).unwrap();
            assert_eq!(v.width(), s.len() as u32);
            assert_eq!(v.to_u64(), Some(u64::from_str_radix(s, 2).unwrap()));
        }
    }

    #[test]
    fn binary_string_keeps_unknown_positions() {
        let v = LogicVec::from_binary_str("1x0z").unwrap();
        assert_eq!(v.get(3), Logic::One);
        assert_eq!(v.get(2), Logic::X);
        assert_eq!(v.get(1), Logic::Zero);
        assert_eq!(v.get(0), Logic::Z);
        assert!(v.has_unknown());
        assert_eq!(v.to_u64(), None);
        assert_eq!(format!("{v}"), "1x0z");
    }

    #[test]
    fn binary_string_rejects_garbage() {
        assert!(LogicVec::from_binary_str("102").is_none());
        assert!(LogicVec::from_binary_str("").is_none());
        assert!(LogicVec::from_binary_str("__").is_none());
        assert_eq!(
            LogicVec::from_binary_str("1111_0000").unwrap().to_u64(),
            Some(0xF0)
        );
    }

    #[test]
    fn wide_vectors_span_words() {
        let mut v = LogicVec::new(100);
        v.set(99, Logic::One);
        v.set(40, Logic::Z);
        assert_eq!(v.get(99), Logic::One);
        assert_eq!(v.get(40), Logic::Z);
        assert_eq!(v.get(41), Logic::Zero);
        assert_eq!(v.to_u64(), None);
    }

    #[test]
    fn digit_groups() {
        let v = LogicVec::from_u64(0xA5, 8);
        assert_eq!(v.digit(0, 4), Some('5'));
        assert_eq!(v.digit(4, 4), Some('A'));
        let u = LogicVec::from_binary_str("xxxx0011").unwrap();
        assert_eq!(u.digit(4, 4), Some('x'));
        assert_eq!(u.digit(0, 4), Some('3'));
        let m = LogicVec::from_binary_str("x1").unwrap();
        assert_eq!(m.digit(0, 4), None);
        // a partial top group only looks at bits in range
        let p = LogicVec::from_binary_str("zz0000").unwrap();
        assert_eq!(p.digit(4, 4), Some('z'));
    }

    #[test]
    fn complement_and_resize() {
        let v = LogicVec::from_binary_str("10x").unwrap();
        assert_eq!(format!("{}", !&v), "01x");
        assert_eq!(format!("{}", v.resized(5)), "0010x");
        assert_eq!(format!("{}", v.resized(2)), "0x");
    }

    #[test]
    fn serde_roundtrip() {
        let v = LogicVec::from_binary_str("1z01").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
