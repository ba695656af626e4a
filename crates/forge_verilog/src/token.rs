//! Leaf tokens of generated Verilog.
//!
//! Keywords and symbols are closed enums. A [`Token`] compares and hashes by
//! its rendered text, so `Symbol::Le` and `Symbol::NonBlocking` are equal
//! tokens even though the printer spaces them the same way for different
//! reasons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A reserved word emitted by the code generator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Keyword {
    /// `module`
    Module,
    /// `endmodule`
    Endmodule,
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `signed`
    Signed,
    /// `assign`
    Assign,
    /// `always`
    Always,
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
    /// `or` (event list separator)
    Or,
    /// `begin`
    Begin,
    /// `end`
    End,
    /// `if`
    If,
    /// `else`
    Else,
    /// `case`
    Case,
    /// `endcase`
    Endcase,
    /// `default`
    Default,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Keyword; 20] = [
        Keyword::Module,
        Keyword::Endmodule,
        Keyword::Input,
        Keyword::Output,
        Keyword::Inout,
        Keyword::Wire,
        Keyword::Reg,
        Keyword::Signed,
        Keyword::Assign,
        Keyword::Always,
        Keyword::Posedge,
        Keyword::Negedge,
        Keyword::Or,
        Keyword::Begin,
        Keyword::End,
        Keyword::If,
        Keyword::Else,
        Keyword::Case,
        Keyword::Endcase,
        Keyword::Default,
    ];

    /// The keyword text.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Module => "module",
            Keyword::Endmodule => "endmodule",
            Keyword::Input => "input",
            Keyword::Output => "output",
            Keyword::Inout => "inout",
            Keyword::Wire => "wire",
            Keyword::Reg => "reg",
            Keyword::Signed => "signed",
            Keyword::Assign => "assign",
            Keyword::Always => "always",
            Keyword::Posedge => "posedge",
            Keyword::Negedge => "negedge",
            Keyword::Or => "or",
            Keyword::Begin => "begin",
            Keyword::End => "end",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Case => "case",
            Keyword::Endcase => "endcase",
            Keyword::Default => "default",
        }
    }

    /// Looks up a keyword by its exact (case-sensitive) text.
    pub fn lookup(s: &str) -> Option<Keyword> {
        Keyword::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Punctuation and operators.
///
/// Characters that play more than one syntactic role get one variant per
/// role so the printer can space them correctly: `:` in a range, after a
/// case label and inside a ternary; `-`, `&`, `|` and `^` as prefix and
/// infix operators; `<=` as comparison and non-blocking assignment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Symbol {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.` before a named port connection or hierarchical name
    Dot,
    /// `@`
    At,
    /// `#`
    Hash,
    /// `*` inside `@(*)`
    Star,
    /// `:` between the bounds of a range
    RangeColon,
    /// `:` after a case label
    LabelColon,
    /// `?`
    Question,
    /// `:` in a conditional expression
    ConditionElse,
    /// `=`
    Assign,
    /// `<=` as a non-blocking assignment
    NonBlocking,
    /// `+`
    Plus,
    /// `-` as subtraction
    Minus,
    /// `*` as multiplication
    Times,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `&` as bitwise and
    BitAnd,
    /// `|` as bitwise or
    BitOr,
    /// `^` as bitwise xor
    BitXor,
    /// `~^` as bitwise xnor
    BitXnor,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=` as a comparison
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `>>>`
    ShiftRightArith,
    /// prefix `-`
    Negate,
    /// prefix `!`
    LogicalNot,
    /// prefix `~`
    Complement,
    /// prefix `&`
    ReduceAnd,
    /// prefix `|`
    ReduceOr,
    /// prefix `^`
    ReduceXor,
    /// prefix `~&`
    ReduceNand,
    /// prefix `~|`
    ReduceNor,
    /// prefix `~^`
    ReduceXnor,
}

impl Symbol {
    /// The symbol text.
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::LBracket => "[",
            Symbol::RBracket => "]",
            Symbol::LBrace => "{",
            Symbol::RBrace => "}",
            Symbol::Comma => ",",
            Symbol::Semicolon => ";",
            Symbol::Dot => ".",
            Symbol::At => "@",
            Symbol::Hash => "#",
            Symbol::Star | Symbol::Times => "*",
            Symbol::RangeColon | Symbol::LabelColon | Symbol::ConditionElse => ":",
            Symbol::Question => "?",
            Symbol::Assign => "=",
            Symbol::NonBlocking | Symbol::Le => "<=",
            Symbol::Plus => "+",
            Symbol::Minus | Symbol::Negate => "-",
            Symbol::Divide => "/",
            Symbol::Modulo => "%",
            Symbol::BitAnd | Symbol::ReduceAnd => "&",
            Symbol::BitOr | Symbol::ReduceOr => "|",
            Symbol::BitXor | Symbol::ReduceXor => "^",
            Symbol::BitXnor | Symbol::ReduceXnor => "~^",
            Symbol::LogicalAnd => "&&",
            Symbol::LogicalOr => "||",
            Symbol::Eq => "==",
            Symbol::Ne => "!=",
            Symbol::Lt => "<",
            Symbol::Gt => ">",
            Symbol::Ge => ">=",
            Symbol::ShiftLeft => "<<",
            Symbol::ShiftRight => ">>",
            Symbol::ShiftRightArith => ">>>",
            Symbol::LogicalNot => "!",
            Symbol::Complement => "~",
            Symbol::ReduceNand => "~&",
            Symbol::ReduceNor => "~|",
        }
    }

    /// Returns `true` for prefix operators, which bind to the following token.
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            Symbol::Negate
                | Symbol::LogicalNot
                | Symbol::Complement
                | Symbol::ReduceAnd
                | Symbol::ReduceOr
                | Symbol::ReduceXor
                | Symbol::ReduceNand
                | Symbol::ReduceNor
                | Symbol::ReduceXnor
        )
    }

    /// Returns `true` for openers that are never followed by a space.
    pub fn is_opener(self) -> bool {
        matches!(
            self,
            Symbol::LParen
                | Symbol::LBracket
                | Symbol::LBrace
                | Symbol::At
                | Symbol::Hash
                | Symbol::Dot
                | Symbol::RangeColon
        )
    }

    /// Returns `true` for closers and separators that are never preceded by a space.
    pub fn is_closer(self) -> bool {
        matches!(
            self,
            Symbol::RParen
                | Symbol::RBracket
                | Symbol::RBrace
                | Symbol::Comma
                | Symbol::Semicolon
                | Symbol::RangeColon
                | Symbol::LabelColon
        )
    }
}

/// Layout markers. They carry no syntax but are part of the token stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Control {
    /// End of line.
    Newline,
    /// A forced single space.
    Space,
}

impl Control {
    /// The whitespace text.
    pub fn as_str(self) -> &'static str {
        match self {
            Control::Newline => "\n",
            Control::Space => " ",
        }
    }
}

/// An atomic lexical unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Token {
    /// A net, module, instance or port name.
    Identifier(String),
    /// A reserved word.
    Keyword(Keyword),
    /// Punctuation or an operator.
    Symbol(Symbol),
    /// A numeric literal, sized (`8'hFF`) or bare (`3`).
    Number(String),
    /// Layout.
    Control(Control),
    /// Free text such as a `// comment`.
    Text(String),
}

impl Token {
    /// Creates an identifier token.
    pub fn ident(name: impl Into<String>) -> Self {
        Token::Identifier(name.into())
    }

    /// Creates a bare decimal number token.
    pub fn number(value: impl fmt::Display) -> Self {
        Token::Number(value.to_string())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        match self {
            Token::Identifier(s) | Token::Number(s) | Token::Text(s) => s,
            Token::Keyword(k) => k.as_str(),
            Token::Symbol(s) => s.as_str(),
            Token::Control(c) => c.as_str(),
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Keyword> for Token {
    fn from(k: Keyword) -> Self {
        Token::Keyword(k)
    }
}

impl From<Symbol> for Token {
    fn from(s: Symbol) -> Self {
        Token::Symbol(s)
    }
}

impl From<Control> for Token {
    fn from(c: Control) -> Self {
        Token::Control(c)
    }
}
