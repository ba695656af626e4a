//! The operation nodes handed to the lowering layer.
//!
//! The front end resolves every operand to a width and a signedness before
//! lowering, and marks compile-time constants with their value. An operand
//! whose value is missing is a precondition failure, not something the
//! lowering layer tries to recover from.

use crate::error::{LowerError, LowerResult};
use forge_verilog::{to_verilog_identifier, BinaryOp, Expr, Literal, Net, UnaryOp};
use serde::{Deserialize, Serialize};

/// Width, signedness and optional constant value of an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandValue {
    /// Width in bits.
    pub width: u32,
    /// Two's-complement interpretation.
    pub signed: bool,
    /// Value when known at compile time.
    pub constant: Option<u64>,
}

/// A named operand or result of an operation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    /// Front-end name; sanitized into a Verilog identifier on use.
    pub name: String,
    /// Resolved value, `None` when the front end left it unresolved.
    pub value: Option<OperandValue>,
}

impl Operand {
    /// A resolved, non-constant operand.
    pub fn new(name: impl Into<String>, width: u32, signed: bool) -> Self {
        Self {
            name: name.into(),
            value: Some(OperandValue {
                width,
                signed,
                constant: None,
            }),
        }
    }

    /// Unsigned operand.
    pub fn unsigned(name: impl Into<String>, width: u32) -> Self {
        Self::new(name, width, false)
    }

    /// Signed operand.
    pub fn signed(name: impl Into<String>, width: u32) -> Self {
        Self::new(name, width, true)
    }

    /// A compile-time constant.
    pub fn constant(name: impl Into<String>, value: u64, width: u32, signed: bool) -> Self {
        Self {
            name: name.into(),
            value: Some(OperandValue {
                width,
                signed,
                constant: Some(value),
            }),
        }
    }

    /// An operand the front end did not resolve.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Identifier of the net carrying this operand.
    pub fn identifier(&self) -> String {
        to_verilog_identifier(&self.name)
    }

    /// Checks the operand is resolved and non-empty. `node` names the
    /// operation for error messages.
    pub(crate) fn resolve(&self, node: &str) -> LowerResult<Signal> {
        let value = self.value.ok_or_else(|| LowerError::MissingOperandValue {
            node: node.to_string(),
            operand: self.name.clone(),
        })?;
        if value.width == 0 {
            return Err(LowerError::ZeroWidth {
                node: node.to_string(),
                operand: self.name.clone(),
            });
        }
        let net = Net::wire(self.identifier(), value.width).with_signed(value.signed);
        Ok(Signal {
            net,
            signed: value.signed,
            constant: value.constant,
        })
    }
}

/// A resolved operand: the net it lives on plus its constant value.
#[derive(Debug, Clone)]
pub(crate) struct Signal {
    pub(crate) net: Net,
    pub(crate) signed: bool,
    pub(crate) constant: Option<u64>,
}

impl Signal {
    pub(crate) fn width(&self) -> u32 {
        self.net.width()
    }

    /// The operand as an expression: its net, or a literal for constants.
    pub(crate) fn expr(&self) -> Expr {
        match self.constant {
            Some(value) => Expr::Literal(Literal::hex(value, self.width())),
            None => Expr::Net(self.net.clone()),
        }
    }

    /// The net, unless the operand is a constant.
    pub(crate) fn consumed(&self) -> Option<&Net> {
        match self.constant {
            Some(_) => None,
            None => Some(&self.net),
        }
    }
}

/// Two-operand operators lowered through width-normalizing shims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `~^`
    Xnor,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
}

impl ArithOp {
    /// The syntax-model operator.
    pub fn binary_op(self) -> BinaryOp {
        match self {
            ArithOp::Add => BinaryOp::Add,
            ArithOp::Sub => BinaryOp::Sub,
            ArithOp::Div => BinaryOp::Div,
            ArithOp::Mod => BinaryOp::Mod,
            ArithOp::And => BinaryOp::And,
            ArithOp::Or => BinaryOp::Or,
            ArithOp::Xor => BinaryOp::Xor,
            ArithOp::Xnor => BinaryOp::Xnor,
            ArithOp::LogicalAnd => BinaryOp::LogicalAnd,
            ArithOp::LogicalOr => BinaryOp::LogicalOr,
        }
    }
}

/// Relational and equality operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// The syntax-model operator.
    pub fn binary_op(self) -> BinaryOp {
        match self {
            CompareOp::Eq => BinaryOp::Eq,
            CompareOp::Ne => BinaryOp::Ne,
            CompareOp::Lt => BinaryOp::Lt,
            CompareOp::Le => BinaryOp::Le,
            CompareOp::Gt => BinaryOp::Gt,
            CompareOp::Ge => BinaryOp::Ge,
        }
    }

    /// `<=` and `>=`, the operators covered by the signed-compare policy.
    pub fn is_inclusive_relation(self) -> bool {
        matches!(self, CompareOp::Le | CompareOp::Ge)
    }
}

/// Shift direction and fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    /// `<<`, zero fill.
    Left,
    /// `>>`, zero fill.
    RightLogical,
    /// `>>>`, sign fill.
    RightArithmetic,
}

/// A clocked register and whichever control inputs it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSpec {
    /// Register output.
    pub result: Operand,
    /// Next-state data.
    pub data: Operand,
    /// Clock.
    pub clock: Operand,
    /// Load enable.
    pub enable: Option<Operand>,
    /// Synchronous set.
    pub set: Option<Operand>,
    /// Synchronous reset.
    pub reset: Option<Operand>,
    /// Asynchronous preset.
    pub preset: Option<Operand>,
    /// Asynchronous clear.
    pub clear: Option<Operand>,
    /// Initial value; reset restores it and set drives its complement.
    pub init: Option<u64>,
}

impl RegisterSpec {
    /// A plain register with no control inputs.
    pub fn new(result: Operand, data: Operand, clock: Operand) -> Self {
        Self {
            result,
            data,
            clock,
            enable: None,
            set: None,
            reset: None,
            preset: None,
            clear: None,
            init: None,
        }
    }

    /// Adds a load enable.
    pub fn with_enable(mut self, enable: Operand) -> Self {
        self.enable = Some(enable);
        self
    }

    /// Adds a synchronous set.
    pub fn with_set(mut self, set: Operand) -> Self {
        self.set = Some(set);
        self
    }

    /// Adds a synchronous reset.
    pub fn with_reset(mut self, reset: Operand) -> Self {
        self.reset = Some(reset);
        self
    }

    /// Adds an asynchronous preset.
    pub fn with_preset(mut self, preset: Operand) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Adds an asynchronous clear.
    pub fn with_clear(mut self, clear: Operand) -> Self {
        self.clear = Some(clear);
        self
    }

    /// Sets the initial value.
    pub fn with_init(mut self, init: u64) -> Self {
        self.init = Some(init);
        self
    }
}

/// One operation to lower. The set of node kinds is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpNode {
    /// Arithmetic, bitwise or logical two-operand operation.
    Binary {
        /// Operator.
        op: ArithOp,
        /// Left operand.
        left: Operand,
        /// Right operand.
        right: Operand,
        /// Result.
        result: Operand,
    },
    /// Multiplication.
    Multiply {
        /// Left operand.
        left: Operand,
        /// Right operand.
        right: Operand,
        /// Result.
        result: Operand,
    },
    /// Equality or relational comparison.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        left: Operand,
        /// Right operand.
        right: Operand,
        /// One-bit result.
        result: Operand,
    },
    /// One-operand operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Operand,
        /// Result.
        result: Operand,
    },
    /// Shift by a constant or variable amount.
    Shift {
        /// Direction and fill.
        kind: ShiftKind,
        /// Shifted value.
        operand: Operand,
        /// Shift amount, always unsigned.
        amount: Operand,
        /// Result.
        result: Operand,
        /// Stage bound; the configured default applies when `None`.
        max_stages: Option<u32>,
    },
    /// Inferred register.
    Register(RegisterSpec),
    /// Selects `inputs[select]`.
    EncodedMux {
        /// Binary-encoded select.
        select: Operand,
        /// Data inputs, index 0 first.
        inputs: Vec<Operand>,
        /// Result.
        result: Operand,
    },
}

impl OpNode {
    /// The result operand.
    pub fn result(&self) -> &Operand {
        match self {
            OpNode::Binary { result, .. }
            | OpNode::Multiply { result, .. }
            | OpNode::Compare { result, .. }
            | OpNode::Unary { result, .. }
            | OpNode::Shift { result, .. }
            | OpNode::EncodedMux { result, .. } => result,
            OpNode::Register(spec) => &spec.result,
        }
    }

    /// Short name of the node kind for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            OpNode::Binary { .. } => "binary",
            OpNode::Multiply { .. } => "multiply",
            OpNode::Compare { .. } => "compare",
            OpNode::Unary { .. } => "unary",
            OpNode::Shift { .. } => "shift",
            OpNode::Register(_) => "register",
            OpNode::EncodedMux { .. } => "mux",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_checks_value() {
        let s = Operand::signed("a", 8).resolve("sum").unwrap();
        assert_eq!(s.width(), 8);
        assert!(s.net.is_signed());
        assert!(matches!(
            Operand::unresolved("b").resolve("sum"),
            Err(LowerError::MissingOperandValue { .. })
        ));
        assert!(matches!(
            Operand::unsigned("c", 0).resolve("sum"),
            Err(LowerError::ZeroWidth { .. })
        ));
    }

    #[test]
    fn names_are_sanitized() {
        let s = Operand::unsigned("add#3.out", 4).resolve("x").unwrap();
        assert_eq!(s.net.name(), "add_3_out");
    }

    #[test]
    fn constants_become_literals() {
        let s = Operand::constant("k", 0x1F3, 8, false).resolve("x").unwrap();
        assert_eq!(s.expr().to_string(), "8'hF3");
        assert!(s.consumed().is_none());
    }

    #[test]
    fn node_serde() {
        let node = OpNode::Register(
            RegisterSpec::new(
                Operand::unsigned("q", 4),
                Operand::unsigned("d", 4),
                Operand::unsigned("clk", 1),
            )
            .with_reset(Operand::unsigned("rst", 1))
            .with_init(0xF),
        );
        let json = serde_json::to_string(&node).unwrap();
        let back: OpNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
        assert_eq!(back.result().name, "q");
        assert_eq!(back.kind_name(), "register");
    }
}
