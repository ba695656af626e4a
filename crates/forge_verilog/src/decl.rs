//! Net declarations.

use crate::lexicality::{Lexicality, VerilogElement};
use crate::net::{Net, NetKind};
use crate::range::Range;
use crate::token::{Control, Keyword, Symbol, Token};

/// One declaration statement, e.g. `wire signed [7:0] a, b;`.
///
/// Nets of the same kind, width and signedness share a declaration.
/// Memories always get their own.
#[derive(Debug, Clone)]
pub struct Declaration {
    kind: NetKind,
    width: u32,
    signed: bool,
    reversed: bool,
    nets: Vec<Net>,
}

impl Declaration {
    /// Starts a declaration holding `net`. `reversed` emits `[lsb:msb]`.
    pub fn new(net: Net, reversed: bool) -> Self {
        Self {
            kind: net.kind().clone(),
            width: net.width(),
            signed: net.is_signed(),
            reversed,
            nets: vec![net],
        }
    }

    /// Whether `net` can be appended to this declaration.
    pub fn accepts(&self, net: &Net) -> bool {
        !matches!(self.kind, NetKind::Memory { .. })
            && *net.kind() == self.kind
            && net.width() == self.width
            && net.is_signed() == self.signed
    }

    pub(crate) fn push(&mut self, net: Net) {
        self.nets.push(net);
    }

    /// Removes and returns the net named `name`.
    pub(crate) fn take(&mut self, name: &str) -> Option<Net> {
        let pos = self.nets.iter().position(|n| n.name() == name)?;
        Some(self.nets.remove(pos))
    }

    /// Returns `true` if the range is emitted as `[lsb:msb]`.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Declared kind.
    pub fn kind(&self) -> &NetKind {
        &self.kind
    }

    /// Nets in declaration order.
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Returns `true` once every net has been removed.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}

impl VerilogElement for Declaration {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        for keyword in self.kind.keywords() {
            lex.push(*keyword);
        }
        if self.signed {
            lex.push(Keyword::Signed);
        }
        if self.width > 1 {
            if let Ok(range) = Range::of_width(self.width) {
                lex.nested(range.lexicalify(self.reversed));
            }
        }
        for (i, net) in self.nets.iter().enumerate() {
            if i > 0 {
                lex.push(Symbol::Comma);
            }
            lex.ident(net.name());
            if let NetKind::Memory { depth } = self.kind {
                lex.push(Symbol::LBracket)
                    .push(Token::number(0))
                    .push(Symbol::RangeColon)
                    .push(Token::number(depth.saturating_sub(1)))
                    .push(Symbol::RBracket);
            }
            if let Some(init) = net.init() {
                lex.push(Symbol::Assign).element(init);
            }
        }
        lex.push(Symbol::Semicolon).push(Control::Newline);
        lex
    }
}

display_via_lexicality!(Declaration);
