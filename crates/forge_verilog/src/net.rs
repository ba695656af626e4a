//! Named, sized signals.

use crate::error::{VerilogError, VerilogResult};
use crate::expr::Expr;
use crate::lexicality::{Lexicality, VerilogElement};
use crate::literal::Literal;
use crate::range::Range;
use crate::token::{Keyword, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// How a net is declared.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NetKind {
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `input`
    Input,
    /// `output`
    Output,
    /// `output reg`: an output driven from an `always` block.
    OutputReg,
    /// `inout`
    Inout,
    /// A net inside another module instance, referenced as `scope.name`.
    /// Never declared locally.
    Qualified {
        /// Instance path prefix.
        scope: String,
    },
    /// A `reg` array. Declared explicitly, never auto-declared.
    Memory {
        /// Number of entries.
        depth: u32,
    },
}

impl NetKind {
    /// Returns `true` for kinds that appear in a module header.
    pub fn is_port(&self) -> bool {
        matches!(
            self,
            NetKind::Input | NetKind::Output | NetKind::OutputReg | NetKind::Inout
        )
    }

    /// The declaration keywords; empty for nets never declared locally.
    pub fn keywords(&self) -> &'static [Keyword] {
        match self {
            NetKind::Wire => &[Keyword::Wire],
            NetKind::Reg | NetKind::Memory { .. } => &[Keyword::Reg],
            NetKind::Input => &[Keyword::Input],
            NetKind::Output => &[Keyword::Output],
            NetKind::OutputReg => &[Keyword::Output, Keyword::Reg],
            NetKind::Inout => &[Keyword::Inout],
            NetKind::Qualified { .. } => &[],
        }
    }
}

impl fmt::Display for NetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetKind::Qualified { scope } => write!(f, "qualified ({scope})"),
            NetKind::Memory { depth } => write!(f, "memory [{depth}]"),
            other => {
                let words: Vec<&str> = other.keywords().iter().map(|k| k.as_str()).collect();
                f.write_str(&words.join(" "))
            }
        }
    }
}

/// A named signal. Two nets are the same net when their identifiers match.
///
/// Bit positions are always counted from the least significant bit. A net
/// declared with an ascending `[0:w-1]` range renders its selects mirrored,
/// so `bit(0)` of a 4-bit ascending net is emitted as `name[3]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    name: String,
    width: u32,
    kind: NetKind,
    signed: bool,
    init: Option<Literal>,
    #[serde(default)]
    ascending: bool,
}

impl Net {
    /// Creates an unsigned net.
    pub fn new(name: impl Into<String>, width: u32, kind: NetKind) -> Self {
        Self {
            name: name.into(),
            width,
            kind,
            signed: false,
            init: None,
            ascending: false,
        }
    }

    /// Unsigned `wire`.
    pub fn wire(name: impl Into<String>, width: u32) -> Self {
        Self::new(name, width, NetKind::Wire)
    }

    /// Unsigned `reg`.
    pub fn reg(name: impl Into<String>, width: u32) -> Self {
        Self::new(name, width, NetKind::Reg)
    }

    /// Unsigned `input`.
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        Self::new(name, width, NetKind::Input)
    }

    /// Unsigned `output`.
    pub fn output(name: impl Into<String>, width: u32) -> Self {
        Self::new(name, width, NetKind::Output)
    }

    /// A net of another instance.
    pub fn qualified(scope: impl Into<String>, name: impl Into<String>, width: u32) -> Self {
        Self::new(
            name,
            width,
            NetKind::Qualified {
                scope: scope.into(),
            },
        )
    }

    /// A memory of `depth` entries, each `width` bits.
    pub fn memory(name: impl Into<String>, width: u32, depth: u32) -> Self {
        Self::new(name, width, NetKind::Memory { depth })
    }

    /// Sets signedness.
    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Sets the declaration-time initial value.
    pub fn with_init(mut self, init: Literal) -> Self {
        self.init = Some(init);
        self
    }

    /// Marks the net as declared `[0:w-1]`.
    pub fn with_ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub(crate) fn set_ascending(&mut self, ascending: bool) {
        self.ascending = ascending;
    }

    /// Same identifier, width and signedness with another kind.
    pub fn with_kind(mut self, kind: NetKind) -> Self {
        self.kind = kind;
        self
    }

    /// Identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in bits (per entry for memories).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Declared kind.
    pub fn kind(&self) -> &NetKind {
        &self.kind
    }

    /// Returns `true` if declared `signed`.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Declaration-time initial value, if any.
    pub fn init(&self) -> Option<&Literal> {
        self.init.as_ref()
    }

    /// Returns `true` if declared with an ascending range.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Position of bit `index` as written in a select of this net.
    pub fn written_index(&self, index: u32) -> u32 {
        if self.ascending {
            self.width.saturating_sub(1).saturating_sub(index)
        } else {
            index
        }
    }

    fn describe(&self) -> String {
        format!("net `{}` ({} bits)", self.name, self.width)
    }

    /// `name[index]`. A one-bit net selects itself.
    pub fn bit(&self, index: u32) -> VerilogResult<Expr> {
        if index >= self.width {
            return Err(VerilogError::IllegalBitRange {
                target: self.describe(),
                msb: index,
                lsb: index,
            });
        }
        if self.width == 1 {
            return Ok(Expr::Net(self.clone()));
        }
        Ok(Expr::BitSelect {
            net: self.clone(),
            index,
        })
    }

    /// `name[msb:lsb]`. A one-bit net selects itself.
    pub fn range(&self, msb: u32, lsb: u32) -> VerilogResult<Expr> {
        let range = Range::new(msb, lsb).map_err(|_| VerilogError::IllegalBitRange {
            target: self.describe(),
            msb,
            lsb,
        })?;
        if msb >= self.width {
            return Err(VerilogError::IllegalBitRange {
                target: self.describe(),
                msb,
                lsb,
            });
        }
        if self.width == 1 {
            return Ok(Expr::Net(self.clone()));
        }
        Ok(Expr::PartSelect {
            net: self.clone(),
            range,
        })
    }
}

impl PartialEq for Net {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Net {}

impl Hash for Net {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl VerilogElement for Net {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        if let NetKind::Qualified { scope } = &self.kind {
            lex.ident(scope).push(Symbol::Dot);
        }
        lex.ident(&self.name);
        lex
    }
}

display_via_lexicality!(Net);
