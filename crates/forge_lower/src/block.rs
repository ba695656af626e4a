//! The output of lowering one node.

use forge_diagnostics::Diagnostic;
use forge_verilog::{Lexicality, Net, Statement, VerilogElement};
use std::fmt;

/// Statements generated for one operation node, with the nets it reads and
/// drives. Nets are kept in first-seen order without duplicates.
#[derive(Debug, Clone, Default)]
pub struct OpBlock {
    statements: Vec<Statement>,
    consumed: Vec<Net>,
    produced: Vec<Net>,
    notes: Vec<Diagnostic>,
}

fn push_unique(nets: &mut Vec<Net>, net: &Net) {
    if !nets.contains(net) {
        nets.push(net.clone());
    }
}

impl OpBlock {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub(crate) fn consume(&mut self, net: Option<&Net>) {
        if let Some(net) = net {
            push_unique(&mut self.consumed, net);
        }
    }

    pub(crate) fn produce(&mut self, net: &Net) {
        push_unique(&mut self.produced, net);
    }

    pub(crate) fn note(&mut self, diag: Diagnostic) {
        self.notes.push(diag);
    }

    /// Generated statements in emission order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Nets read by the block.
    pub fn consumed(&self) -> &[Net] {
        &self.consumed
    }

    /// Nets driven by the block, the result last.
    pub fn produced(&self) -> &[Net] {
        &self.produced
    }

    /// Policy notes raised while lowering.
    pub fn notes(&self) -> &[Diagnostic] {
        &self.notes
    }
}

impl VerilogElement for OpBlock {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        for stmt in &self.statements {
            lex.element(stmt);
        }
        lex
    }
}

impl fmt::Display for OpBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.lexicalify(), f)
    }
}
