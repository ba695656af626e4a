//! Lowering errors and their diagnostic codes.
//!
//! Codes `E300`--`E307` report syntax-model failures surfaced while building
//! a block (width imbalance, bad selects, registry conflicts). Codes
//! `E308`--`E312` report malformed operation nodes. `P001` marks the signed
//! relational-compare policy changing how a comparison is emitted.

use forge_diagnostics::{Category, Diagnostic, DiagnosticCode};
use forge_verilog::VerilogError;
use thiserror::Error;

/// Assignment target narrower than its value.
pub const E300: DiagnosticCode = DiagnosticCode::new(Category::Error, 300);

/// Operands of a width-preserving operator differ in width.
pub const E301: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

/// Bit or part select outside the net.
pub const E302: DiagnosticCode = DiagnosticCode::new(Category::Error, 302);

/// Declaration registry conflict.
pub const E303: DiagnosticCode = DiagnosticCode::new(Category::Error, 303);

/// Conditional arms of different widths.
pub const E304: DiagnosticCode = DiagnosticCode::new(Category::Error, 304);

/// Linearizing an element that produced no tokens.
pub const E305: DiagnosticCode = DiagnosticCode::new(Category::Error, 305);

/// Malformed literal digits.
pub const E306: DiagnosticCode = DiagnosticCode::new(Category::Error, 306);

/// Assignment to something that is not a net or select.
pub const E307: DiagnosticCode = DiagnosticCode::new(Category::Error, 307);

/// Register control inputs with no matching template.
pub const E308: DiagnosticCode = DiagnosticCode::new(Category::Error, 308);

/// Shift network deeper than its stage bound.
pub const E309: DiagnosticCode = DiagnosticCode::new(Category::Error, 309);

/// Operand without width or signedness.
pub const E310: DiagnosticCode = DiagnosticCode::new(Category::Error, 310);

/// Zero-width operand, result or shift amount.
pub const E311: DiagnosticCode = DiagnosticCode::new(Category::Error, 311);

/// Encoded mux whose inputs do not fit its select.
pub const E312: DiagnosticCode = DiagnosticCode::new(Category::Error, 312);

/// A `<=`/`>=` comparison of unsigned data emitted as a signed compare.
pub const P001: DiagnosticCode = DiagnosticCode::new(Category::Policy, 1);

/// Result alias for lowering.
pub type LowerResult<T> = Result<T, LowerError>;

/// Why an operation node could not be lowered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerError {
    /// The syntax model rejected a construct.
    #[error(transparent)]
    Verilog(#[from] VerilogError),

    /// No register template has this set of control inputs.
    #[error("register `{register}` has no template for control inputs [{inputs}]")]
    UnknownRegConfiguration {
        /// Register result name.
        register: String,
        /// Connected control inputs, comma separated.
        inputs: String,
    },

    /// The shift amount needs more stages than allowed.
    #[error("shift `{result}` needs {stages} stages but at most {max} are allowed")]
    StageOverflow {
        /// Shift result name.
        result: String,
        /// Width of the shift amount.
        stages: u32,
        /// Stage bound in effect.
        max: u32,
    },

    /// An operand carries no width/signedness.
    #[error("operand `{operand}` of `{node}` has no resolved width or signedness")]
    MissingOperandValue {
        /// Node result name.
        node: String,
        /// Operand name.
        operand: String,
    },

    /// An operand or result is zero bits wide.
    #[error("operand `{operand}` of `{node}` is zero bits wide")]
    ZeroWidth {
        /// Node result name.
        node: String,
        /// Operand name.
        operand: String,
    },

    /// A variable shift amount with no bits.
    #[error("shift `{result}` has a zero-width shift amount")]
    ShiftByZero {
        /// Shift result name.
        result: String,
    },

    /// Too few data inputs, or more than the select can address.
    #[error("mux `{result}` has {inputs} data inputs for a {select_width}-bit select")]
    MuxArity {
        /// Mux result name.
        result: String,
        /// Number of data inputs.
        inputs: usize,
        /// Select width.
        select_width: u32,
    },
}

fn verilog_code(err: &VerilogError) -> DiagnosticCode {
    match err {
        VerilogError::UnbalancedAssignment { .. } => E300,
        VerilogError::UnbalancedOperation { .. } => E301,
        VerilogError::IllegalBitRange { .. } => E302,
        VerilogError::PortDeclaration { source, .. } => verilog_code(source),
        VerilogError::DuplicateDeclaration { .. }
        | VerilogError::NotDeclarable { .. }
        | VerilogError::NotAPort { .. }
        | VerilogError::NotDeclared { .. } => E303,
        VerilogError::ConditionalWidthMismatch { .. } => E304,
        VerilogError::EmptyLexicality => E305,
        VerilogError::InvalidLiteral { .. } => E306,
        VerilogError::NotAssignable { .. } => E307,
    }
}

impl LowerError {
    /// The stable code reported for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            LowerError::Verilog(err) => verilog_code(err),
            LowerError::UnknownRegConfiguration { .. } => E308,
            LowerError::StageOverflow { .. } => E309,
            LowerError::MissingOperandValue { .. } => E310,
            LowerError::ZeroWidth { .. } | LowerError::ShiftByZero { .. } => E311,
            LowerError::MuxArity { .. } => E312,
        }
    }

    /// Converts into an error diagnostic naming `construct`.
    pub fn to_diagnostic(&self, construct: &str) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string()).with_construct(construct);
        match self {
            LowerError::StageOverflow { max, .. } => {
                diag.with_note(format!("the shift amount must be at most {max} bits wide"))
            }
            LowerError::UnknownRegConfiguration { .. } => diag.with_note(
                "synchronous set/reset cannot be combined with asynchronous preset/clear",
            ),
            _ => diag,
        }
    }
}
