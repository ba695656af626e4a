//! Statements: assignments, control flow, always blocks and instances.

use crate::error::{VerilogError, VerilogResult};
use crate::expr::{push_unique, Expr};
use crate::lexicality::{Lexicality, VerilogElement};
use crate::net::Net;
use crate::token::{Control, Keyword, Symbol, Token};

/// The three assignment forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignKind {
    /// `assign lhs = rhs;`
    Continuous,
    /// `lhs = rhs;`
    Blocking,
    /// `lhs <= rhs;`
    NonBlocking,
}

/// One arm of a `case` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    /// Labels matched by this arm, joined with commas.
    pub labels: Vec<Expr>,
    /// Statement run on a match.
    pub body: Statement,
}

/// The sensitivity list of an `always` block.
#[derive(Debug, Clone, PartialEq)]
pub enum EventControl {
    /// `@(posedge a or posedge b ...)`
    Posedge(Vec<Net>),
    /// `@(*)`
    Any,
}

/// A named port connection `.port(expr)`; `None` leaves the port open.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Port name on the instantiated module.
    pub port: String,
    /// Connected expression.
    pub expr: Option<Expr>,
}

/// A module instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Instantiated module name.
    pub module: String,
    /// Instance name.
    pub name: String,
    /// Parameter overrides `#(.NAME(value))`.
    pub parameters: Vec<(String, Expr)>,
    /// Port connections.
    pub connections: Vec<Connection>,
}

/// A Verilog statement or module item.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A width-checked assignment.
    Assign {
        /// Assignment form.
        kind: AssignKind,
        /// Left-hand side.
        target: Expr,
        /// Right-hand side.
        value: Expr,
    },
    /// `begin ... end`
    Block(Vec<Statement>),
    /// Statements emitted one after another with no framing.
    List(Vec<Statement>),
    /// `if (cond) then [else otherwise]`
    If {
        /// Condition.
        cond: Expr,
        /// Taken branch.
        then: Box<Statement>,
        /// Optional else branch.
        otherwise: Option<Box<Statement>>,
    },
    /// `case (selector) ... endcase`
    Case {
        /// Selector.
        selector: Expr,
        /// Labelled arms in order.
        arms: Vec<CaseArm>,
        /// `default:` arm.
        default: Option<Box<Statement>>,
    },
    /// `always @(...) body`
    Always {
        /// Sensitivity list.
        events: EventControl,
        /// Body.
        body: Box<Statement>,
    },
    /// A module instance.
    Instance(Instance),
    /// `// text`
    Comment(String),
}

fn is_assignable(expr: &Expr) -> bool {
    match expr {
        Expr::Net(_) | Expr::BitSelect { .. } | Expr::PartSelect { .. } | Expr::Index { .. } => {
            true
        }
        Expr::Concat(parts) => !parts.is_empty() && parts.iter().all(is_assignable),
        _ => false,
    }
}

impl Statement {
    /// An assignment whose target is at least as wide as its value.
    ///
    /// Fails with [`VerilogError::UnbalancedAssignment`] when the target is
    /// narrower, and [`VerilogError::NotAssignable`] when the target is not
    /// a net, a select or a concatenation of those.
    pub fn assign(kind: AssignKind, target: impl Into<Expr>, value: Expr) -> VerilogResult<Self> {
        let target = target.into();
        if !is_assignable(&target) {
            return Err(VerilogError::NotAssignable {
                expr: target.to_string(),
            });
        }
        if target.width() < value.width() {
            return Err(VerilogError::UnbalancedAssignment {
                target: target.to_string(),
                target_width: target.width(),
                value_width: value.width(),
            });
        }
        Ok(Statement::Assign {
            kind,
            target,
            value,
        })
    }

    /// `assign target = value;`
    pub fn continuous(target: impl Into<Expr>, value: Expr) -> VerilogResult<Self> {
        Self::assign(AssignKind::Continuous, target, value)
    }

    /// `target = value;`
    pub fn blocking(target: impl Into<Expr>, value: Expr) -> VerilogResult<Self> {
        Self::assign(AssignKind::Blocking, target, value)
    }

    /// `target <= value;`
    pub fn non_blocking(target: impl Into<Expr>, value: Expr) -> VerilogResult<Self> {
        Self::assign(AssignKind::NonBlocking, target, value)
    }

    /// `if (cond) then else otherwise`.
    pub fn if_else(cond: Expr, then: Statement, otherwise: Option<Statement>) -> Self {
        Statement::If {
            cond,
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// `always @(events) body`.
    pub fn always(events: EventControl, body: Statement) -> Self {
        Statement::Always {
            events,
            body: Box::new(body),
        }
    }

    /// Every net referenced, without duplicates, in order of first reference.
    pub fn nets(&self) -> Vec<Net> {
        let mut out = Vec::new();
        self.collect_nets(&mut out);
        out
    }

    fn collect_nets(&self, out: &mut Vec<Net>) {
        match self {
            Statement::Assign { target, value, .. } => {
                target.collect_nets(out);
                value.collect_nets(out);
            }
            Statement::Block(stmts) | Statement::List(stmts) => {
                stmts.iter().for_each(|s| s.collect_nets(out))
            }
            Statement::If {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_nets(out);
                then.collect_nets(out);
                if let Some(otherwise) = otherwise {
                    otherwise.collect_nets(out);
                }
            }
            Statement::Case {
                selector,
                arms,
                default,
            } => {
                selector.collect_nets(out);
                for arm in arms {
                    arm.labels.iter().for_each(|l| l.collect_nets(out));
                    arm.body.collect_nets(out);
                }
                if let Some(default) = default {
                    default.collect_nets(out);
                }
            }
            Statement::Always { events, body } => {
                if let EventControl::Posedge(nets) = events {
                    nets.iter().for_each(|n| push_unique(out, n));
                }
                body.collect_nets(out);
            }
            Statement::Instance(instance) => {
                for conn in &instance.connections {
                    if let Some(expr) = &conn.expr {
                        expr.collect_nets(out);
                    }
                }
            }
            Statement::Comment(_) => {}
        }
    }

    /// Visits every net reference in place, event lists included.
    pub(crate) fn visit_nets_mut(&mut self, f: &mut dyn FnMut(&mut Net)) {
        match self {
            Statement::Assign { target, value, .. } => {
                target.visit_nets_mut(f);
                value.visit_nets_mut(f);
            }
            Statement::Block(stmts) | Statement::List(stmts) => {
                stmts.iter_mut().for_each(|s| s.visit_nets_mut(f))
            }
            Statement::If {
                cond,
                then,
                otherwise,
            } => {
                cond.visit_nets_mut(f);
                then.visit_nets_mut(f);
                if let Some(otherwise) = otherwise {
                    otherwise.visit_nets_mut(f);
                }
            }
            Statement::Case {
                selector,
                arms,
                default,
            } => {
                selector.visit_nets_mut(f);
                for arm in arms {
                    arm.labels.iter_mut().for_each(|l| l.visit_nets_mut(f));
                    arm.body.visit_nets_mut(f);
                }
                if let Some(default) = default {
                    default.visit_nets_mut(f);
                }
            }
            Statement::Always { events, body } => {
                if let EventControl::Posedge(nets) = events {
                    nets.iter_mut().for_each(|n| f(n));
                }
                body.visit_nets_mut(f);
            }
            Statement::Instance(instance) => {
                for conn in &mut instance.connections {
                    if let Some(expr) = &mut conn.expr {
                        expr.visit_nets_mut(f);
                    }
                }
            }
            Statement::Comment(_) => {}
        }
    }
}

fn named_connection<'a>(lex: &mut Lexicality<'a>, name: &str, expr: Option<&'a Expr>) {
    lex.push(Symbol::Dot).ident(name).push(Symbol::LParen);
    if let Some(expr) = expr {
        lex.element(expr);
    }
    lex.push(Symbol::RParen);
}

impl VerilogElement for Statement {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        match self {
            Statement::Assign {
                kind,
                target,
                value,
            } => {
                let op = match kind {
                    AssignKind::Continuous => {
                        lex.push(Keyword::Assign);
                        Symbol::Assign
                    }
                    AssignKind::Blocking => Symbol::Assign,
                    AssignKind::NonBlocking => Symbol::NonBlocking,
                };
                lex.element(target)
                    .push(op)
                    .element(value)
                    .push(Symbol::Semicolon)
                    .newline();
            }
            Statement::Block(stmts) => {
                lex.push(Keyword::Begin).newline();
                for stmt in stmts {
                    lex.element(stmt);
                }
                lex.push(Keyword::End).newline();
            }
            Statement::List(stmts) => {
                for stmt in stmts {
                    lex.element(stmt);
                }
            }
            Statement::If {
                cond,
                then,
                otherwise,
            } => {
                lex.push(Keyword::If)
                    .push(Symbol::LParen)
                    .element(cond)
                    .push(Symbol::RParen)
                    .element(then.as_ref());
                if let Some(otherwise) = otherwise {
                    lex.push(Keyword::Else).element(otherwise.as_ref());
                }
            }
            Statement::Case {
                selector,
                arms,
                default,
            } => {
                lex.push(Keyword::Case)
                    .push(Symbol::LParen)
                    .element(selector)
                    .push(Symbol::RParen)
                    .newline();
                for arm in arms {
                    lex.separated(&arm.labels, Symbol::Comma)
                        .push(Symbol::LabelColon)
                        .element(&arm.body);
                }
                if let Some(default) = default {
                    lex.push(Keyword::Default)
                        .push(Symbol::LabelColon)
                        .element(default.as_ref());
                }
                lex.push(Keyword::Endcase).newline();
            }
            Statement::Always { events, body } => {
                lex.push(Keyword::Always).push(Symbol::At).push(Symbol::LParen);
                match events {
                    EventControl::Posedge(nets) => {
                        for (i, net) in nets.iter().enumerate() {
                            if i > 0 {
                                lex.push(Keyword::Or);
                            }
                            lex.push(Keyword::Posedge).element(net);
                        }
                    }
                    EventControl::Any => {
                        lex.push(Symbol::Star);
                    }
                }
                lex.push(Symbol::RParen).element(body.as_ref());
            }
            Statement::Instance(instance) => {
                lex.ident(&instance.module);
                if !instance.parameters.is_empty() {
                    lex.push(Symbol::Hash).push(Symbol::LParen);
                    for (i, (name, value)) in instance.parameters.iter().enumerate() {
                        if i > 0 {
                            lex.push(Symbol::Comma);
                        }
                        named_connection(&mut lex, name, Some(value));
                    }
                    lex.push(Symbol::RParen);
                }
                lex.ident(&instance.name).push(Symbol::LParen);
                for (i, conn) in instance.connections.iter().enumerate() {
                    if i > 0 {
                        lex.push(Symbol::Comma);
                    }
                    named_connection(&mut lex, &conn.port, conn.expr.as_ref());
                }
                lex.push(Symbol::RParen).push(Symbol::Semicolon).newline();
            }
            Statement::Comment(text) => {
                lex.push(Token::Text(format!("// {text}")))
                    .push(Control::Newline);
            }
        }
        lex
    }
}

display_via_lexicality!(Statement);
