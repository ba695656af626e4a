//! Bit ranges for declarations and part-selects.

use crate::error::{VerilogError, VerilogResult};
use crate::lexicality::Lexicality;
use crate::token::{Symbol, Token};
use serde::{Deserialize, Serialize};

/// An inclusive `[msb:lsb]` range with `lsb <= msb`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Range {
    msb: u32,
    lsb: u32,
}

impl Range {
    /// Creates a range, rejecting `lsb > msb`.
    pub fn new(msb: u32, lsb: u32) -> VerilogResult<Self> {
        if lsb > msb {
            return Err(VerilogError::IllegalBitRange {
                target: "range".to_string(),
                msb,
                lsb,
            });
        }
        Ok(Self { msb, lsb })
    }

    /// The range `[width-1:0]`. Width zero has no range.
    pub fn of_width(width: u32) -> VerilogResult<Self> {
        match width.checked_sub(1) {
            Some(msb) => Ok(Self { msb, lsb: 0 }),
            None => Err(VerilogError::IllegalBitRange {
                target: "zero-width range".to_string(),
                msb: 0,
                lsb: 1,
            }),
        }
    }

    /// Most significant bit.
    pub fn msb(self) -> u32 {
        self.msb
    }

    /// Least significant bit.
    pub fn lsb(self) -> u32 {
        self.lsb
    }

    /// Number of bits covered, saturating at `u32::MAX`.
    pub fn width(self) -> u32 {
        (self.msb - self.lsb).saturating_add(1)
    }

    /// The same bits counted from the other end of a `width`-bit vector.
    pub fn mirrored(self, width: u32) -> Self {
        let top = width.saturating_sub(1);
        Self {
            msb: top.saturating_sub(self.lsb),
            lsb: top.saturating_sub(self.msb),
        }
    }

    /// `[msb:lsb]`, or `[lsb:msb]` when `reversed`.
    pub(crate) fn lexicalify(self, reversed: bool) -> Lexicality<'static> {
        let (left, right) = if reversed {
            (self.lsb, self.msb)
        } else {
            (self.msb, self.lsb)
        };
        let mut lex = Lexicality::new();
        lex.push(Symbol::LBracket)
            .push(Token::number(left))
            .push(Symbol::RangeColon)
            .push(Token::number(right))
            .push(Symbol::RBracket);
        lex
    }
}
