//! Structured reporting for code-generation failures and policy notes.
//!
//! A [`Diagnostic`] pairs a stable [`DiagnosticCode`] with a message and the
//! identity of the construct that caused it (a module, net or operation
//! node). The thread-safe [`DiagnosticSink`] collects them while a design is
//! lowered, and [`DiagnosticRenderer`] implementations format them for a
//! terminal or as JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
