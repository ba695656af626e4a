//! Conformance helpers for the Forge lowering layer.
//!
//! Provides a pipeline function that lowers a list of operation nodes into a
//! module and returns the module, the blocks and every diagnostic for
//! assertion in integration tests, plus a two-state [`Evaluator`] used as
//! the reference semantics for generated logic.

#![warn(missing_docs)]

pub mod eval;

pub use eval::{EvalError, EvalResult, Evaluator, Value};

use forge_config::{load_config_from_str, CodegenConfig, ConfigError};
use forge_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use forge_lower::{Lowerer, OpBlock, OpNode};
use forge_verilog::{Module, Net};

/// Result of lowering a list of nodes into one module.
pub struct LoweringResult {
    /// The module, holding every node that lowered successfully.
    pub module: Module,
    /// One block per successfully lowered node, in order.
    pub blocks: Vec<OpBlock>,
    /// Number of ports the module header rejected.
    pub failed_ports: usize,
    /// All diagnostics emitted while lowering.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
}

impl LoweringResult {
    /// Diagnostics of the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }
}

/// Parses a `forge.toml` body into the code-generation settings.
pub fn make_config(toml: &str) -> Result<CodegenConfig, ConfigError> {
    Ok(load_config_from_str(toml)?.codegen)
}

/// Lowers `nodes` into a module named `name` with default settings.
pub fn lower_module(name: &str, ports: &[Net], nodes: &[OpNode]) -> LoweringResult {
    lower_module_with_config(name, ports, nodes, &CodegenConfig::default())
}

/// Lowers `nodes` into a module named `name`.
///
/// A port or node that fails is reported and skipped; lowering continues
/// with the next one. Rejected ports are counted in
/// [`LoweringResult::failed_ports`].
pub fn lower_module_with_config(
    name: &str,
    ports: &[Net],
    nodes: &[OpNode],
    config: &CodegenConfig,
) -> LoweringResult {
    let sink = DiagnosticSink::new();
    let mut lowerer = Lowerer::new(name, config, &sink);
    let mut failed_ports = 0;
    for port in ports {
        if let Err(err) = lowerer.add_port(port.clone()) {
            log::debug!("skipping port `{}`: {err}", port.name());
            failed_ports += 1;
        }
    }
    let blocks = nodes
        .iter()
        .filter_map(|node| lowerer.lower(node).ok())
        .collect();
    let module = lowerer.finish();
    log::debug!("lowered `{}` with {} errors", module.name(), sink.error_count());
    LoweringResult {
        module,
        blocks,
        failed_ports,
        has_errors: sink.has_errors(),
        error_count: sink.error_count(),
        diagnostics: sink.take_all(),
    }
}
