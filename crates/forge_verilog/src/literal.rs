//! Sized numeric literals.
//!
//! One [`Literal`] type covers all four radices; the radix only changes how
//! [`Literal::text`] renders the digits.

use crate::error::{VerilogError, VerilogResult};
use crate::lexicality::{Lexicality, VerilogElement};
use crate::token::Token;
use forge_common::{Logic, LogicVec};
use serde::{Deserialize, Serialize};

/// Digit base of a sized literal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Radix {
    /// `'d`
    Decimal,
    /// `'b`
    Binary,
    /// `'o`
    Octal,
    /// `'h`
    Hex,
}

impl Radix {
    /// The base letter following the apostrophe.
    pub fn letter(self) -> char {
        match self {
            Radix::Decimal => 'd',
            Radix::Binary => 'b',
            Radix::Octal => 'o',
            Radix::Hex => 'h',
        }
    }

    fn bits_per_digit(self) -> Option<u32> {
        match self {
            Radix::Decimal => None,
            Radix::Binary => Some(1),
            Radix::Octal => Some(3),
            Radix::Hex => Some(4),
        }
    }
}

/// The stored value of a literal.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum LiteralValue {
    /// A fully known value already masked to the literal width.
    Known(u64),
    /// Per-bit storage, used when a bit is `x`/`z` or a known value is wider than 64 bits.
    Bits(LogicVec),
}

/// A sized constant `<width>'<radix><digits>`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Literal {
    radix: Radix,
    width: u32,
    value: LiteralValue,
}

/// All-ones mask for `width` bits, saturating at 64.
pub(crate) fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Returns `true` if a literal digit string has any unknown (`x`) or
/// high-impedance (`z`, `?`) digit.
pub fn is_mixed_bit_string(digits: &str) -> bool {
    digits
        .chars()
        .any(|c| matches!(c, 'x' | 'X' | 'z' | 'Z' | '?'))
}

impl Literal {
    /// Creates a literal holding `value & ((1 << width) - 1)`.
    ///
    /// At 64 bits and wider the value is kept as given.
    pub fn new(value: u64, width: u32, radix: Radix) -> Self {
        Self {
            radix,
            width,
            value: LiteralValue::Known(value & mask(width)),
        }
    }

    /// Decimal literal.
    pub fn decimal(value: u64, width: u32) -> Self {
        Self::new(value, width, Radix::Decimal)
    }

    /// Binary literal.
    pub fn binary(value: u64, width: u32) -> Self {
        Self::new(value, width, Radix::Binary)
    }

    /// Octal literal.
    pub fn octal(value: u64, width: u32) -> Self {
        Self::new(value, width, Radix::Octal)
    }

    /// Hexadecimal literal.
    pub fn hex(value: u64, width: u32) -> Self {
        Self::new(value, width, Radix::Hex)
    }

    /// All bits zero, rendered in hex.
    pub fn zero(width: u32) -> Self {
        Self::hex(0, width)
    }

    /// All bits one, rendered in hex.
    pub fn ones(width: u32) -> Self {
        if width <= 64 {
            Self::hex(u64::MAX, width)
        } else {
            Self::from_bits(&!&LogicVec::new(width), Radix::Hex)
        }
    }

    /// Builds a literal from per-bit values; the width is the vector width.
    pub fn from_bits(bits: &LogicVec, radix: Radix) -> Self {
        let value = match bits.to_u64() {
            Some(v) => LiteralValue::Known(v),
            None => LiteralValue::Bits(bits.clone()),
        };
        Self {
            radix,
            width: bits.width(),
            value,
        }
    }

    /// Parses a binary digit string such as `"10x1"`, most significant bit
    /// first. Unknown and high-impedance digits keep their positions.
    pub fn parse_binary(digits: &str) -> VerilogResult<Self> {
        let bits = LogicVec::from_binary_str(digits).ok_or_else(|| VerilogError::InvalidLiteral {
            text: digits.to_string(),
        })?;
        Ok(Self::from_bits(&bits, Radix::Binary))
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Radix used for rendering.
    pub fn radix(&self) -> Radix {
        self.radix
    }

    /// Same value rendered in another radix.
    pub fn with_radix(mut self, radix: Radix) -> Self {
        self.radix = radix;
        self
    }

    /// The stored value.
    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    /// The numeric value, if every bit is known and it fits in 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        match &self.value {
            LiteralValue::Known(v) if self.width <= 64 => Some(*v),
            LiteralValue::Known(_) => None,
            LiteralValue::Bits(bits) => bits.to_u64(),
        }
    }

    /// Returns `true` if any bit is `x` or `z`.
    pub fn is_mixed(&self) -> bool {
        match &self.value {
            LiteralValue::Known(_) => false,
            LiteralValue::Bits(bits) => bits.has_unknown(),
        }
    }

    /// Bit `index`; positions at or above the width read as zero.
    pub fn bit(&self, index: u32) -> Logic {
        if index >= self.width {
            return Logic::Zero;
        }
        match &self.value {
            LiteralValue::Known(v) => Logic::from_bool(index < 64 && (v >> index) & 1 != 0),
            LiteralValue::Bits(bits) => bits.get(index),
        }
    }

    /// Bitwise complement at the same width and radix.
    pub fn complement(&self) -> Self {
        match &self.value {
            LiteralValue::Known(v) if self.width <= 64 => Self::new(!v, self.width, self.radix),
            _ => Self::from_bits(&!&self.to_bits(), self.radix),
        }
    }

    fn to_bits(&self) -> LogicVec {
        match &self.value {
            LiteralValue::Known(v) => LogicVec::from_u64(*v, self.width),
            LiteralValue::Bits(bits) => bits.clone(),
        }
    }

    /// Full literal text, e.g. `8'hA5` or `4'b1x0z`.
    ///
    /// Per-bit values that cannot be written in the chosen radix (decimal,
    /// or a digit group mixing known and unknown bits) fall back to hex and
    /// then binary.
    pub fn text(&self) -> String {
        let (radix, digits) = match &self.value {
            LiteralValue::Known(v) => (self.radix, known_digits(*v, self.radix)),
            LiteralValue::Bits(bits) => bit_digits(bits, self.radix),
        };
        format!("{}'{}{}", self.width, radix.letter(), digits)
    }
}

fn known_digits(v: u64, radix: Radix) -> String {
    match radix {
        Radix::Decimal => v.to_string(),
        Radix::Binary => format!("{v:b}"),
        Radix::Octal => format!("{v:o}"),
        Radix::Hex => format!("{v:X}"),
    }
}

fn bit_digits(bits: &LogicVec, radix: Radix) -> (Radix, String) {
    let preferred = match radix {
        Radix::Decimal => Radix::Hex,
        other => other,
    };
    for candidate in [preferred, Radix::Binary] {
        let Some(per_digit) = candidate.bits_per_digit() else {
            continue;
        };
        let count = bits.width().div_ceil(per_digit).max(1);
        let digits: Option<String> = (0..count)
            .rev()
            .map(|i| bits.digit(i * per_digit, per_digit))
            .collect();
        if let Some(digits) = digits {
            return (candidate, trim_leading_zeros(&digits));
        }
    }
    (Radix::Binary, bits.to_string())
}

// A leading x or z digit would be extended to the full width, so one zero
// is kept in front of it.
fn trim_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    match trimmed.chars().next() {
        None => "0".to_string(),
        Some(c) if !c.is_ascii_hexdigit() && trimmed.len() < digits.len() => format!("0{trimmed}"),
        Some(_) => trimmed.to_string(),
    }
}

impl VerilogElement for Literal {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        lex.push(Token::Number(self.text()));
        lex
    }
}

display_via_lexicality!(Literal);
