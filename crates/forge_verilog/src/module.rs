//! Modules: the declaration registry plus the ordered statement list.

use crate::decl::Declaration;
use crate::error::{VerilogError, VerilogResult};
use crate::ident::to_verilog_identifier;
use crate::lexicality::{Lexicality, VerilogElement};
use crate::net::{Net, NetKind};
use crate::stmt::Statement;
use crate::token::{Keyword, Symbol};
use forge_config::CodegenConfig;
use std::collections::{HashMap, HashSet};

/// Emission options fixed when a module is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Declare port ranges as `[lsb:msb]`. Internal nets stay `[msb:lsb]`.
    pub reverse_port_ranges: bool,
    /// Lowercase the module identifier.
    pub lowercase_name: bool,
}

impl From<&CodegenConfig> for ModuleOptions {
    fn from(config: &CodegenConfig) -> Self {
        Self {
            reverse_port_ranges: config.invert_port_range,
            lowercase_name: config.lowercase_module_names,
        }
    }
}

/// A Verilog module under construction.
///
/// Each identifier is declared at most once. A `wire` may be redeclared as a
/// port or a `reg`, and an `output` and a `reg` of the same name merge into
/// an `output reg`. Statements are appended with [`Module::state`], which
/// declares any nets they use that are not yet known. Once linearization
/// starts the module is no longer mutated.
///
/// With [`ModuleOptions::reverse_port_ranges`], every select of a reversed
/// port is rendered against its `[0:w-1]` declaration.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    options: ModuleOptions,
    ports: Vec<Net>,
    declarations: Vec<Declaration>,
    registry: HashMap<String, NetKind>,
    ascending: HashSet<String>,
    statements: Vec<Statement>,
}

impl Module {
    /// Creates an empty module with default options.
    pub fn new(name: &str) -> Self {
        Self::with_options(name, ModuleOptions::default())
    }

    /// Creates an empty module; `name` is turned into a legal identifier.
    pub fn with_options(name: &str, options: ModuleOptions) -> Self {
        let mut name = to_verilog_identifier(name);
        if options.lowercase_name {
            name = name.to_lowercase();
        }
        Self {
            name,
            options,
            ports: Vec::new(),
            declarations: Vec::new(),
            registry: HashMap::new(),
            ascending: HashSet::new(),
            statements: Vec::new(),
        }
    }

    /// Module identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emission options.
    pub fn options(&self) -> ModuleOptions {
        self.options
    }

    /// Ports in header order.
    pub fn ports(&self) -> &[Net] {
        &self.ports
    }

    /// Declarations in emission order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Statements in emission order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns `true` if `name` is in the registry.
    pub fn is_declared(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Kind `name` is declared with.
    pub fn declared_kind(&self, name: &str) -> Option<&NetKind> {
        self.registry.get(name)
    }

    /// Returns `true` if `name` is in the port list.
    pub fn has_port(&self, name: &str) -> bool {
        self.ports.iter().any(|p| p.name() == name)
    }

    /// Declares `net`.
    ///
    /// A net already declared as `wire` is upgraded when `net` is a port or
    /// a `reg`. An `output` and a `reg` merge into an `output reg`, keeping
    /// whichever initial value is present. Any other redeclaration fails
    /// with [`VerilogError::DuplicateDeclaration`]; qualified nets fail with
    /// [`VerilogError::NotDeclarable`].
    pub fn declare(&mut self, net: Net) -> VerilogResult<()> {
        if let NetKind::Qualified { .. } = net.kind() {
            return Err(VerilogError::NotDeclarable {
                name: net.name().to_string(),
                kind: net.kind().to_string(),
            });
        }
        if net.name().is_empty() {
            return Ok(());
        }
        let mut net = net;
        let mut slot = None;
        if let Some(existing) = self.registry.get(net.name()).cloned() {
            let kind = match (&existing, net.kind()) {
                (NetKind::Wire, requested) if requested.is_port() || *requested == NetKind::Reg => {
                    requested.clone()
                }
                (NetKind::Output, NetKind::Reg) | (NetKind::Reg, NetKind::Output) => {
                    NetKind::OutputReg
                }
                _ => {
                    return Err(VerilogError::DuplicateDeclaration {
                        name: net.name().to_string(),
                        existing: existing.to_string(),
                        requested: net.kind().to_string(),
                    })
                }
            };
            log::trace!("{}: redeclaring {} `{}` as {}", self.name, existing, net.name(), kind);
            if let Some((pos, previous)) = self.take_declared(net.name()) {
                slot = Some(pos);
                if net.init().is_none() {
                    if let Some(init) = previous.init() {
                        net = net.with_init(init.clone());
                    }
                }
            }
            net = net.with_kind(kind);
            for port in self.ports.iter_mut().filter(|p| p.name() == net.name()) {
                *port = port.clone().with_kind(net.kind().clone());
            }
        }
        let reversed = self.options.reverse_port_ranges && net.kind().is_port();
        let reoriented = if reversed && net.width() > 1 {
            self.ascending.insert(net.name().to_string())
        } else {
            self.ascending.remove(net.name())
        };
        self.registry.insert(net.name().to_string(), net.kind().clone());
        match self
            .declarations
            .iter_mut()
            .find(|d| d.accepts(&net) && d.is_reversed() == reversed)
        {
            Some(decl) => decl.push(net),
            None => {
                let pos = slot.unwrap_or(self.declarations.len());
                self.declarations.insert(pos, Declaration::new(net, reversed));
            }
        }
        if reoriented {
            self.orient_statements();
        }
        Ok(())
    }

    /// Removes `net` from the registry, the header and its declaration,
    /// dropping the declaration once it is empty.
    pub fn undeclare(&mut self, net: &Net) -> VerilogResult<()> {
        if !self.is_declared(net.name()) {
            return Err(VerilogError::NotDeclared {
                name: net.name().to_string(),
            });
        }
        self.take_declared(net.name());
        self.ports.retain(|p| p.name() != net.name());
        if self.ascending.remove(net.name()) {
            self.orient_statements();
        }
        Ok(())
    }

    /// Removes `name` from the registry and its declaration. Returns the
    /// net with the position its declaration held.
    fn take_declared(&mut self, name: &str) -> Option<(usize, Net)> {
        self.registry.remove(name);
        let pos = self
            .declarations
            .iter()
            .position(|d| d.nets().iter().any(|n| n.name() == name))?;
        let net = self.declarations[pos].take(name)?;
        if self.declarations[pos].is_empty() {
            self.declarations.remove(pos);
        }
        Some((pos, net))
    }

    /// Marks every reference to a reversed port so its selects render
    /// against the `[0:w-1]` declaration.
    fn orient_statements(&mut self) {
        let ascending = &self.ascending;
        let mut orient = |net: &mut Net| net.set_ascending(ascending.contains(net.name()));
        for statement in &mut self.statements {
            statement.visit_nets_mut(&mut orient);
        }
    }

    /// Declares `net` as a port and appends it to the header.
    ///
    /// Failures are wrapped in [`VerilogError::PortDeclaration`] naming this
    /// module.
    pub fn add_port(&mut self, net: Net) -> VerilogResult<()> {
        let result = if net.kind().is_port() {
            self.declare(net.clone())
        } else {
            Err(VerilogError::NotAPort {
                name: net.name().to_string(),
                kind: net.kind().to_string(),
            })
        };
        result.map_err(|source| VerilogError::PortDeclaration {
            module: self.name.clone(),
            source: Box::new(source),
        })?;
        if !self.has_port(net.name()) {
            let kind = self.registry.get(net.name()).cloned();
            self.ports.push(match kind {
                Some(kind) => net.with_kind(kind),
                None => net,
            });
        }
        Ok(())
    }

    /// Appends `statement`, first declaring every net it references that is
    /// not yet declared. Memories and qualified nets are never declared here.
    pub fn state(&mut self, mut statement: Statement) -> VerilogResult<()> {
        for net in statement.nets() {
            if net.name().is_empty()
                || self.is_declared(net.name())
                || matches!(net.kind(), NetKind::Memory { .. } | NetKind::Qualified { .. })
            {
                continue;
            }
            log::trace!("{}: auto-declaring {} `{}`", self.name, net.kind(), net.name());
            if net.kind().is_port() {
                self.add_port(net)?;
            } else {
                self.declare(net)?;
            }
        }
        let ascending = &self.ascending;
        statement.visit_nets_mut(&mut |net: &mut Net| {
            net.set_ascending(ascending.contains(net.name()))
        });
        self.statements.push(statement);
        Ok(())
    }
}

impl VerilogElement for Module {
    fn lexicalify(&self) -> Lexicality<'_> {
        let mut lex = Lexicality::new();
        lex.push(Keyword::Module).ident(&self.name);
        if !self.ports.is_empty() {
            lex.push(Symbol::LParen);
            for (i, port) in self.ports.iter().enumerate() {
                if i > 0 {
                    lex.push(Symbol::Comma);
                }
                lex.ident(port.name());
            }
            lex.push(Symbol::RParen);
        }
        lex.push(Symbol::Semicolon).newline();
        for decl in &self.declarations {
            lex.element(decl);
        }
        for stmt in &self.statements {
            lex.element(stmt);
        }
        lex.push(Keyword::Endmodule).newline();
        lex
    }
}

display_via_lexicality!(Module);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryOp, Expr};
    use crate::literal::Literal;

    #[test]
    fn same_kind_twice_fails() {
        let mut m = Module::new("top");
        m.declare(Net::wire("a", 4)).unwrap();
        let err = m.declare(Net::wire("a", 4)).unwrap_err();
        assert!(matches!(err, VerilogError::DuplicateDeclaration { .. }));
        m.declare(Net::reg("r", 1)).unwrap();
        assert!(m.declare(Net::input("r", 1)).is_err());
    }

    #[test]
    fn wire_upgrades_to_port() {
        let mut m = Module::new("top");
        m.declare(Net::wire("a", 4)).unwrap();
        m.declare(Net::wire("b", 4)).unwrap();
        m.declare(Net::input("a", 4)).unwrap();
        assert_eq!(m.declared_kind("a"), Some(&NetKind::Input));
        assert_eq!(m.declarations().len(), 2);
        assert_eq!(m.declarations()[0].nets().len(), 1);
        // a port cannot be downgraded back
        assert!(m.declare(Net::wire("a", 4)).is_err());
    }

    #[test]
    fn wire_upgrades_to_reg() {
        let mut m = Module::new("top");
        m.declare(Net::wire("q", 4)).unwrap();
        m.declare(Net::reg("q", 4).with_init(Literal::hex(0, 4))).unwrap();
        assert_eq!(m.declared_kind("q"), Some(&NetKind::Reg));
        assert_eq!(m.to_string(), "module top;\nreg [3:0] q = 4'h0;\nendmodule\n");
        assert!(m.declare(Net::wire("q", 4)).is_err());
    }

    #[test]
    fn output_and_reg_merge_either_way() {
        let mut m = Module::new("top");
        m.add_port(Net::output("q", 4)).unwrap();
        m.declare(Net::reg("q", 4).with_init(Literal::hex(0x3, 4))).unwrap();
        assert_eq!(m.declared_kind("q"), Some(&NetKind::OutputReg));
        assert_eq!(m.ports()[0].kind(), &NetKind::OutputReg);
        assert_eq!(
            m.to_string(),
            "module top(q);\noutput reg [3:0] q = 4'h3;\nendmodule\n"
        );

        let mut m = Module::new("top");
        m.declare(Net::reg("q", 4).with_init(Literal::hex(0x3, 4))).unwrap();
        m.add_port(Net::output("q", 4)).unwrap();
        assert_eq!(m.ports().len(), 1);
        assert_eq!(
            m.to_string(),
            "module top(q);\noutput reg [3:0] q = 4'h3;\nendmodule\n"
        );
        let err = m.declare(Net::reg("q", 4)).unwrap_err();
        assert!(matches!(err, VerilogError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn input_never_merges_with_reg() {
        let mut m = Module::new("top");
        m.add_port(Net::input("q", 4)).unwrap();
        assert!(m.declare(Net::reg("q", 4)).is_err());
        assert_eq!(m.declared_kind("q"), Some(&NetKind::Input));
    }

    #[test]
    fn undeclare_drops_empty_declarations() {
        let mut m = Module::new("top");
        let a = Net::wire("a", 4);
        let b = Net::wire("b", 4);
        m.declare(a.clone()).unwrap();
        m.declare(b.clone()).unwrap();
        assert_eq!(m.declarations().len(), 1);
        m.undeclare(&a).unwrap();
        assert!(!m.is_declared("a"));
        assert_eq!(m.declarations().len(), 1);
        m.undeclare(&b).unwrap();
        assert!(m.declarations().is_empty());
        assert!(matches!(m.undeclare(&b), Err(VerilogError::NotDeclared { .. })));
    }

    #[test]
    fn port_errors_name_the_module() {
        let mut m = Module::new("alu");
        m.add_port(Net::input("a", 8)).unwrap();
        let err = m.add_port(Net::input("a", 8)).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("module `alu` failed to add port because:"));
        let err = m.add_port(Net::wire("w", 1)).unwrap_err();
        assert!(matches!(err, VerilogError::PortDeclaration { .. }));
        assert_eq!(m.ports().len(), 1);
    }

    #[test]
    fn state_declares_unknown_nets() {
        let mut m = Module::new("top");
        let a = Net::input("a", 4);
        m.add_port(a.clone()).unwrap();
        let t = Net::wire("t", 4);
        let stmt = Statement::continuous(t, Expr::Net(a)).unwrap();
        m.state(stmt).unwrap();
        assert!(m.is_declared("t"));
        assert_eq!(m.statements().len(), 1);
    }

    #[test]
    fn state_skips_memories_and_qualified_nets() {
        let mut m = Module::new("top");
        let y = Net::wire("y", 8);
        let mem = Net::memory("ram", 8, 4);
        let read = Expr::index(mem, Expr::Literal(Literal::decimal(1, 2)));
        let remote = Expr::Net(Net::qualified("u0", "q", 8));
        let value = Expr::binary(BinaryOp::Xor, read, remote).unwrap();
        m.state(Statement::continuous(y, value).unwrap()).unwrap();
        assert!(m.is_declared("y"));
        assert!(!m.is_declared("ram"));
        assert!(!m.is_declared("q"));
        assert!(m.declare(Net::qualified("u0", "q", 8)).is_err());
    }

    #[test]
    fn renders_full_module() {
        let mut m = Module::new("Adder Unit");
        let a = Net::input("a", 8);
        let y = Net::output("y", 8);
        m.add_port(a.clone()).unwrap();
        m.add_port(y.clone()).unwrap();
        m.state(Statement::continuous(y, Expr::Net(a)).unwrap()).unwrap();
        assert_eq!(
            m.to_string(),
            "module Adder_Unit(a, y);\ninput [7:0] a;\noutput [7:0] y;\nassign y = a;\nendmodule\n"
        );
    }

    #[test]
    fn options_from_config() {
        let config = CodegenConfig {
            invert_port_range: true,
            lowercase_module_names: true,
            ..CodegenConfig::default()
        };
        let mut m = Module::with_options("ALU", ModuleOptions::from(&config));
        m.add_port(Net::input("a", 4)).unwrap();
        assert_eq!(m.name(), "alu");
        assert_eq!(m.to_string(), "module alu(a);\ninput [0:3] a;\nendmodule\n");
        assert_eq!(Module::new("empty").to_string(), "module empty;\nendmodule\n");
    }

    #[test]
    fn only_ports_are_reversed() {
        let options = ModuleOptions {
            reverse_port_ranges: true,
            ..ModuleOptions::default()
        };
        let mut m = Module::with_options("top", options);
        let s = Net::input("s", 3);
        let a = Net::input("a", 8);
        m.add_port(s.clone()).unwrap();
        m.add_port(a.clone()).unwrap();
        let t = Net::wire("t", 8);
        let value = Expr::conditional(
            s.bit(0).unwrap(),
            Expr::concat(vec![a.range(3, 0).unwrap(), Expr::Literal(Literal::hex(0, 4))]),
            Expr::Net(a),
        )
        .unwrap();
        m.state(Statement::continuous(t.clone(), value).unwrap()).unwrap();
        m.state(Statement::continuous(Net::wire("u", 1), t.bit(1).unwrap()).unwrap())
            .unwrap();
        assert_eq!(
            m.to_string(),
            "module top(s, a);\n\
             input [0:2] s;\n\
             input [0:7] a;\n\
             wire [7:0] t;\n\
             wire u;\n\
             assign t = s[2] ? {a[4:7], 4'h0} : a;\n\
             assign u = t[1];\n\
             endmodule\n"
        );
    }

    #[test]
    fn late_ports_reorient_earlier_statements() {
        let options = ModuleOptions {
            reverse_port_ranges: true,
            ..ModuleOptions::default()
        };
        let mut m = Module::with_options("top", options);
        let a = Net::wire("a", 4);
        m.state(Statement::continuous(Net::wire("y", 1), a.bit(0).unwrap()).unwrap())
            .unwrap();
        assert_eq!(m.statements()[0].to_string(), "assign y = a[0];\n");
        m.declare(Net::input("a", 4)).unwrap();
        assert_eq!(m.statements()[0].to_string(), "assign y = a[3];\n");
        m.undeclare(&a).unwrap();
        assert_eq!(m.statements()[0].to_string(), "assign y = a[0];\n");
    }
}
