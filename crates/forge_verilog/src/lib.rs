//! Structural Verilog syntax model.
//!
//! Every construct implements [`VerilogElement`] and describes itself as a
//! [`Lexicality`]: an ordered mix of [`Token`]s and nested elements. A
//! lexicality is flattened lazily into a single token stream, which is what
//! printers consume. [`Module`] owns the net declaration registry and the
//! ordered statement list built up by the lowering layer.

#![warn(missing_docs)]

/// Implements `Display` by rendering the type's [`Lexicality`].
macro_rules! display_via_lexicality {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    std::fmt::Display::fmt(&$crate::VerilogElement::lexicalify(self), f)
                }
            }
        )+
    };
}

pub mod decl;
pub mod error;
pub mod expr;
pub mod ident;
pub mod lexicality;
pub mod literal;
pub mod module;
pub mod net;
pub mod range;
pub mod stmt;
pub mod token;

pub use decl::Declaration;
pub use error::{VerilogError, VerilogResult};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use ident::to_verilog_identifier;
pub use lexicality::{render_tokens, Lexeme, Lexicality, TokenStream, VerilogElement};
pub use literal::{is_mixed_bit_string, Literal, LiteralValue, Radix};
pub use module::{Module, ModuleOptions};
pub use net::{Net, NetKind};
pub use range::Range;
pub use stmt::{AssignKind, CaseArm, Connection, EventControl, Instance, Statement};
pub use token::{Control, Keyword, Symbol, Token};
