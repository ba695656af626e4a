//! Drives lowering of a sequence of nodes into one module.

use crate::assign::{lower_binary, lower_compare, lower_multiply, lower_unary};
use crate::block::OpBlock;
use crate::classify::classify_result_net;
use crate::error::{LowerError, LowerResult};
use crate::mux::lower_mux;
use crate::node::OpNode;
use crate::register::lower_register;
use crate::shift::lower_shift;
use forge_config::CodegenConfig;
use forge_diagnostics::DiagnosticSink;
use forge_verilog::{Module, ModuleOptions, Net, NetKind, Statement};

/// Lowers operation nodes into a [`Module`].
///
/// Each node's block is stated into the module in order, so nets it
/// introduces are declared on first use. A result net that an earlier node
/// already declared is redeclared with the kind its driver needs, so a
/// register fed back through a wire still comes out as `reg`. Errors and
/// policy notes are reported to the sink; an error also aborts the node and
/// is returned.
pub struct Lowerer<'a> {
    module: Module,
    config: CodegenConfig,
    sink: &'a DiagnosticSink,
}

impl<'a> Lowerer<'a> {
    /// Starts an empty module named `name`.
    pub fn new(name: &str, config: &CodegenConfig, sink: &'a DiagnosticSink) -> Self {
        Self {
            module: Module::with_options(name, ModuleOptions::from(config)),
            config: config.clone(),
            sink,
        }
    }

    /// The module built so far.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Adds a port to the module header.
    pub fn add_port(&mut self, net: Net) -> LowerResult<()> {
        let name = net.name().to_string();
        self.module.add_port(net).map_err(|err| {
            let err = LowerError::from(err);
            self.report(&err, &format!("port `{name}`"));
            err
        })
    }

    /// Appends a free-standing statement, such as an output connection.
    pub fn state(&mut self, statement: Statement) -> LowerResult<()> {
        self.module.state(statement).map_err(|err| {
            let err = LowerError::from(err);
            self.report(&err, &format!("module `{}`", self.module.name()));
            err
        })
    }

    /// Lowers `node` and states its statements into the module.
    pub fn lower(&mut self, node: &OpNode) -> LowerResult<OpBlock> {
        let construct = format!("{} `{}`", node.kind_name(), node.result().name);
        match self.lower_node(node) {
            Ok(block) => {
                for note in block.notes() {
                    self.sink.emit(note.clone());
                }
                Ok(block)
            }
            Err(err) => {
                self.report(&err, &construct);
                Err(err)
            }
        }
    }

    fn lower_node(&mut self, node: &OpNode) -> LowerResult<OpBlock> {
        let result = classify_result_net(node)?;
        let driven = result.clone();
        log::debug!(
            "{}: lowering {} into {} `{}`",
            self.module.name(),
            node.kind_name(),
            result.kind(),
            result.name()
        );
        let block = match node {
            OpNode::Binary {
                op, left, right, ..
            } => lower_binary(*op, left, right, result)?,
            OpNode::Multiply { left, right, .. } => lower_multiply(left, right, result)?,
            OpNode::Compare {
                op, left, right, ..
            } => lower_compare(*op, left, right, result, self.config.relational_compare)?,
            OpNode::Unary { op, operand, .. } => lower_unary(*op, operand, result)?,
            OpNode::Shift {
                kind,
                operand,
                amount,
                max_stages,
                ..
            } => {
                let max = max_stages.unwrap_or(self.config.default_max_shift_stages);
                lower_shift(*kind, operand, amount, result, max)?
            }
            OpNode::Register(spec) => lower_register(spec, result)?,
            OpNode::EncodedMux { select, inputs, .. } => lower_mux(select, inputs, result)?,
        };
        if self.module.is_declared(driven.name()) {
            self.redeclare_result(driven)?;
        }
        for statement in block.statements() {
            self.module.state(statement.clone())?;
        }
        Ok(block)
    }

    /// Reconciles a result net with an earlier declaration of the same name.
    fn redeclare_result(&mut self, driven: Net) -> LowerResult<()> {
        let compatible = match (self.module.declared_kind(driven.name()), driven.kind()) {
            (Some(existing), requested) if existing == requested => true,
            (Some(NetKind::Output | NetKind::Inout), NetKind::Wire) => true,
            (Some(NetKind::OutputReg), NetKind::Reg) => true,
            _ => false,
        };
        if !compatible {
            self.module.declare(driven)?;
        }
        Ok(())
    }

    fn report(&self, err: &LowerError, construct: &str) {
        log::debug!("{}: {construct} failed: {err}", self.module.name());
        self.sink.emit(err.to_diagnostic(construct));
    }

    /// Finishes and returns the module.
    pub fn finish(self) -> Module {
        self.module
    }
}
