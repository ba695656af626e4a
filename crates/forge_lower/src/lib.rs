//! Lowering of width- and sign-annotated operation nodes into Verilog.
//!
//! Each [`OpNode`] becomes an [`OpBlock`]: the statements implementing it
//! plus the nets it reads and drives. Two-operand nodes go through
//! width-normalizing shim wires, shifts become rewiring or a staged
//! selector network, registers become one of fourteen clocked `always`
//! templates, and encoded muxes become a ternary or a `case`. The
//! [`Lowerer`] states each block into a [`forge_verilog::Module`] and
//! reports failures to a [`forge_diagnostics::DiagnosticSink`].

#![warn(missing_docs)]

pub mod assign;
pub mod block;
pub mod classify;
pub mod error;
pub mod lowerer;
pub mod mux;
pub mod node;
pub mod register;
pub mod shift;

pub use assign::{lower_binary, lower_compare, lower_multiply, lower_unary};
pub use block::OpBlock;
pub use classify::classify_result_net;
pub use error::{LowerError, LowerResult};
pub use lowerer::Lowerer;
pub use mux::lower_mux;
pub use node::{ArithOp, CompareOp, OpNode, Operand, OperandValue, RegisterSpec, ShiftKind};
pub use register::{lower_register, RegKind};
pub use shift::lower_shift;
