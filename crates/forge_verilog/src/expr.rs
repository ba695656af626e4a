//! Expressions with self-determined widths.

use crate::error::{VerilogError, VerilogResult};
use crate::lexicality::{Lexicality, VerilogElement};
use crate::literal::Literal;
use crate::net::{Net, NetKind};
use crate::range::Range;
use crate::token::{Symbol, Token};
use serde::{Deserialize, Serialize};

/// A prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation `-`.
    Negate,
    /// Logical not `!`.
    LogicalNot,
    /// Bitwise complement `~`.
    Complement,
    /// Reduction and `&`.
    ReduceAnd,
    /// Reduction or `|`.
    ReduceOr,
    /// Reduction xor `^`.
    ReduceXor,
    /// Reduction nand `~&`.
    ReduceNand,
    /// Reduction nor `~|`.
    ReduceNor,
    /// Reduction xnor `~^`.
    ReduceXnor,
}

impl UnaryOp {
    /// The operator symbol.
    pub fn symbol(self) -> Symbol {
        match self {
            UnaryOp::Negate => Symbol::Negate,
            UnaryOp::LogicalNot => Symbol::LogicalNot,
            UnaryOp::Complement => Symbol::Complement,
            UnaryOp::ReduceAnd => Symbol::ReduceAnd,
            UnaryOp::ReduceOr => Symbol::ReduceOr,
            UnaryOp::ReduceXor => Symbol::ReduceXor,
            UnaryOp::ReduceNand => Symbol::ReduceNand,
            UnaryOp::ReduceNor => Symbol::ReduceNor,
            UnaryOp::ReduceXnor => Symbol::ReduceXnor,
        }
    }

    /// Result width for an operand of `operand_width` bits.
    pub fn result_width(self, operand_width: u32) -> u32 {
        match self {
            UnaryOp::Negate | UnaryOp::Complement => operand_width,
            _ => 1,
        }
    }
}

/// An infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
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
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    Ashr,
}

impl BinaryOp {
    /// The operator symbol.
    pub fn symbol(self) -> Symbol {
        match self {
            BinaryOp::Add => Symbol::Plus,
            BinaryOp::Sub => Symbol::Minus,
            BinaryOp::Mul => Symbol::Times,
            BinaryOp::Div => Symbol::Divide,
            BinaryOp::Mod => Symbol::Modulo,
            BinaryOp::And => Symbol::BitAnd,
            BinaryOp::Or => Symbol::BitOr,
            BinaryOp::Xor => Symbol::BitXor,
            BinaryOp::Xnor => Symbol::BitXnor,
            BinaryOp::LogicalAnd => Symbol::LogicalAnd,
            BinaryOp::LogicalOr => Symbol::LogicalOr,
            BinaryOp::Eq => Symbol::Eq,
            BinaryOp::Ne => Symbol::Ne,
            BinaryOp::Lt => Symbol::Lt,
            BinaryOp::Le => Symbol::Le,
            BinaryOp::Gt => Symbol::Gt,
            BinaryOp::Ge => Symbol::Ge,
            BinaryOp::Shl => Symbol::ShiftLeft,
            BinaryOp::Shr => Symbol::ShiftRight,
            BinaryOp::Ashr => Symbol::ShiftRightArith,
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ashr => 8,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::And => 5,
            BinaryOp::Xor | BinaryOp::Xnor => 4,
            BinaryOp::Or => 3,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::LogicalOr => 1,
        }
    }

    /// Operators whose operands cannot be regrouped freely.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            BinaryOp::Sub
                | BinaryOp::Div
                | BinaryOp::Mod
                | BinaryOp::Shl
                | BinaryOp::Shr
                | BinaryOp::Ashr
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
        )
    }

    /// Returns `true` for relational and equality operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Returns `true` for `<<`, `>>` and `>>>`.
    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ashr)
    }

    fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    /// Whether both operands must have the same width.
    pub fn requires_balance(self) -> bool {
        !self.is_shift() && !self.is_logical()
    }

    /// Result width for the given operand widths.
    pub fn result_width(self, left: u32, right: u32) -> u32 {
        if self.is_comparison() || self.is_logical() {
            1
        } else if self.is_shift() {
            left
        } else {
            left.max(right)
        }
    }
}

/// A Verilog expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A whole net.
    Net(Net),
    /// A sized constant.
    Literal(Literal),
    /// `net[index]`
    BitSelect {
        /// Selected net.
        net: Net,
        /// Bit position.
        index: u32,
    },
    /// `net[msb:lsb]`. Bounds count from the least significant bit and are
    /// mirrored when rendering a net declared ascending.
    PartSelect {
        /// Selected net.
        net: Net,
        /// Bounds.
        range: Range,
    },
    /// `net[expr]`: a memory word, or one bit of a vector.
    Index {
        /// Indexed net.
        net: Net,
        /// Dynamic index.
        index: Box<Expr>,
    },
    /// `{a, b, ...}`, most significant first.
    Concat(Vec<Expr>),
    /// `{count{expr}}`
    Replicate {
        /// Repetition count.
        count: u32,
        /// Repeated value.
        expr: Box<Expr>,
    },
    /// `cond ? then : otherwise`
    Conditional {
        /// One-bit selector.
        cond: Box<Expr>,
        /// Value when `cond` is true.
        then: Box<Expr>,
        /// Value when `cond` is false.
        otherwise: Box<Expr>,
    },
    /// `left op right`
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `op operand`
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// `(expr)`
    Group(Box<Expr>),
}

impl Expr {
    /// Concatenation of `parts`, most significant first.
    pub fn concat(parts: Vec<Expr>) -> Self {
        Expr::Concat(parts)
    }

    /// `{count{expr}}`.
    pub fn replicate(count: u32, expr: Expr) -> Self {
        Expr::Replicate {
            count,
            expr: Box::new(expr),
        }
    }

    /// `net[index]` with a dynamic index.
    pub fn index(net: Net, index: Expr) -> Self {
        Expr::Index {
            net,
            index: Box::new(index),
        }
    }

    /// Wraps in parentheses.
    pub fn group(expr: Expr) -> Self {
        Expr::Group(Box::new(expr))
    }

    /// `cond ? then : otherwise`.
    ///
    /// The arms must have equal widths. A condition wider than one bit is
    /// rewritten to `cond != 0`.
    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> VerilogResult<Self> {
        if then.width() != otherwise.width() {
            return Err(VerilogError::ConditionalWidthMismatch {
                then_width: then.width(),
                else_width: otherwise.width(),
            });
        }
        let cond = if cond.width() > 1 {
            let zero = Expr::Literal(Literal::zero(cond.width()));
            Expr::binary(BinaryOp::Ne, cond, zero)?
        } else if matches!(cond, Expr::Conditional { .. }) {
            Expr::group(cond)
        } else {
            cond
        };
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// `left op right`, parenthesizing operands as precedence requires.
    ///
    /// Fails with [`VerilogError::UnbalancedOperation`] when a
    /// width-preserving operator gets operands of different widths.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> VerilogResult<Self> {
        if op.requires_balance() && left.width() != right.width() {
            return Err(VerilogError::UnbalancedOperation {
                op: op.symbol().as_str().to_string(),
                left_width: left.width(),
                right_width: right.width(),
            });
        }
        Ok(Expr::Binary {
            op,
            left: Box::new(group_operand(op, left)),
            right: Box::new(group_operand(op, right)),
        })
    }

    /// `op operand`, parenthesizing compound operands.
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let operand = match operand {
            e @ (Expr::Binary { .. } | Expr::Conditional { .. }) => Expr::group(e),
            e => e,
        };
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Self-determined width in bits.
    pub fn width(&self) -> u32 {
        match self {
            Expr::Net(net) => net.width(),
            Expr::Literal(lit) => lit.width(),
            Expr::BitSelect { .. } => 1,
            Expr::PartSelect { range, .. } => range.width(),
            Expr::Index { net, .. } => match net.kind() {
                NetKind::Memory { .. } => net.width(),
                _ => 1,
            },
            Expr::Concat(parts) => parts
                .iter()
                .fold(0u32, |acc, p| acc.saturating_add(p.width())),
            Expr::Replicate { count, expr } => count.saturating_mul(expr.width()),
            Expr::Conditional { then, .. } => then.width(),
            Expr::Binary { op, left, right } => op.result_width(left.width(), right.width()),
            Expr::Unary { op, operand } => op.result_width(operand.width()),
            Expr::Group(inner) => inner.width(),
        }
    }

    /// Every net referenced, without duplicates, in order of first reference.
    pub fn nets(&self) -> Vec<Net> {
        let mut out = Vec::new();
        self.collect_nets(&mut out);
        out
    }

    pub(crate) fn collect_nets(&self, out: &mut Vec<Net>) {
        match self {
            Expr::Net(net) | Expr::BitSelect { net, .. } | Expr::PartSelect { net, .. } => {
                push_unique(out, net)
            }
            Expr::Literal(_) => {}
            Expr::Index { net, index } => {
                push_unique(out, net);
                index.collect_nets(out);
            }
            Expr::Concat(parts) => parts.iter().for_each(|p| p.collect_nets(out)),
            Expr::Replicate { expr, .. } | Expr::Group(expr) => expr.collect_nets(out),
            Expr::Unary { operand, .. } => operand.collect_nets(out),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_nets(out);
                then.collect_nets(out);
                otherwise.collect_nets(out);
            }
            Expr::Binary { left, right, .. } => {
                left.collect_nets(out);
                right.collect_nets(out);
            }
        }
    }

    /// Visits every net reference in place.
    pub(crate) fn visit_nets_mut(&mut self, f: &mut dyn FnMut(&mut Net)) {
        match self {
            Expr::Net(net) | Expr::BitSelect { net, .. } | Expr::PartSelect { net, .. } => f(net),
            Expr::Literal(_) => {}
            Expr::Index { net, index } => {
                f(net);
                index.visit_nets_mut(f);
            }
            Expr::Concat(parts) => parts.iter_mut().for_each(|p| p.visit_nets_mut(f)),
            Expr::Replicate { expr, .. } | Expr::Group(expr) => expr.visit_nets_mut(f),
            Expr::Unary { operand, .. } => operand.visit_nets_mut(f),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                cond.visit_nets_mut(f);
                then.visit_nets_mut(f);
                otherwise.visit_nets_mut(f);
            }
            Expr::Binary { left, right, .. } => {
                left.visit_nets_mut(f);
                right.visit_nets_mut(f);
            }
        }
    }

    /// The net when this is a whole-net reference.
    pub fn as_net(&self) -> Option<&Net> {
        match self {
            Expr::Net(net) => Some(net),
            _ => None,
        }
    }
}

pub(crate) fn push_unique(out: &mut Vec<Net>, net: &Net) {
    if !out.contains(net) {
        out.push(net.clone());
    }
}

fn group_operand(parent: BinaryOp, operand: Expr) -> Expr {
    match operand {
        Expr::Binary { op, .. } if op.precedence() < parent.precedence() || parent.is_ordered() => {
            Expr::group(operand)
        }
        Expr::Conditional { .. } => Expr::group(operand),
        other => other,
    }
}

impl From<Net> for Expr {
    fn from(net: Net) -> Self {
        Expr::Net(net)
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::Literal(lit)
    }
}

impl VerilogElement for Expr {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        match self {
            Expr::Net(net) => {
                lex.element(net);
            }
            Expr::Literal(lit) => {
                lex.element(lit);
            }
            Expr::BitSelect { net, index } => {
                lex.element(net)
                    .push(Symbol::LBracket)
                    .push(Token::number(net.written_index(*index)))
                    .push(Symbol::RBracket);
            }
            Expr::PartSelect { net, range } => {
                let range = if net.is_ascending() {
                    range.mirrored(net.width())
                } else {
                    *range
                };
                lex.element(net).nested(range.lexicalify(net.is_ascending()));
            }
            Expr::Index { net, index } => {
                lex.element(net)
                    .push(Symbol::LBracket)
                    .element(index.as_ref())
                    .push(Symbol::RBracket);
            }
            Expr::Concat(parts) => {
                lex.push(Symbol::LBrace)
                    .separated(parts, Symbol::Comma)
                    .push(Symbol::RBrace);
            }
            Expr::Replicate { count, expr } => {
                lex.push(Symbol::LBrace).push(Token::number(count));
                if matches!(expr.as_ref(), Expr::Concat(_)) {
                    lex.element(expr.as_ref());
                } else {
                    lex.push(Symbol::LBrace)
                        .element(expr.as_ref())
                        .push(Symbol::RBrace);
                }
                lex.push(Symbol::RBrace);
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                lex.element(cond.as_ref())
                    .push(Symbol::Question)
                    .element(then.as_ref())
                    .push(Symbol::ConditionElse)
                    .element(otherwise.as_ref());
            }
            Expr::Binary { op, left, right } => {
                lex.element(left.as_ref())
                    .push(op.symbol())
                    .element(right.as_ref());
            }
            Expr::Unary { op, operand } => {
                lex.push(op.symbol()).element(operand.as_ref());
            }
            Expr::Group(inner) => {
                lex.push(Symbol::LParen)
                    .element(inner.as_ref())
                    .push(Symbol::RParen);
            }
        }
        lex
    }
}

display_via_lexicality!(Expr);
