//! Register inference: one `always` template per combination of control
//! inputs.

use crate::block::OpBlock;
use crate::error::{LowerError, LowerResult};
use crate::node::{Operand, RegisterSpec};
use forge_verilog::{EventControl, Expr, Literal, Net, Statement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The supported register templates, named by their control inputs:
/// `S` set, `R` reset, `E` enable, `P` asynchronous preset, `C`
/// asynchronous clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegKind {
    /// Plain data load.
    Reg,
    /// Synchronous set.
    RegS,
    /// Synchronous reset.
    RegR,
    /// Synchronous reset and set.
    RegRS,
    /// Enable.
    RegE,
    /// Synchronous set with enable.
    RegSE,
    /// Synchronous reset with enable.
    RegRE,
    /// Synchronous reset and set with enable.
    RegRSE,
    /// Asynchronous preset.
    RegP,
    /// Asynchronous clear.
    RegC,
    /// Asynchronous preset with enable.
    RegPE,
    /// Asynchronous clear with enable.
    RegCE,
    /// Asynchronous clear and preset.
    RegCP,
    /// Asynchronous clear and preset with enable.
    RegCPE,
}

impl RegKind {
    /// Every template.
    pub const ALL: [RegKind; 14] = [
        RegKind::Reg,
        RegKind::RegS,
        RegKind::RegR,
        RegKind::RegRS,
        RegKind::RegE,
        RegKind::RegSE,
        RegKind::RegRE,
        RegKind::RegRSE,
        RegKind::RegP,
        RegKind::RegC,
        RegKind::RegPE,
        RegKind::RegCE,
        RegKind::RegCP,
        RegKind::RegCPE,
    ];

    /// Selects the template for `spec`'s control inputs.
    ///
    /// Synchronous set/reset never combine with asynchronous preset/clear;
    /// such registers fail with [`LowerError::UnknownRegConfiguration`].
    pub fn infer(spec: &RegisterSpec) -> LowerResult<RegKind> {
        let enable = spec.enable.is_some();
        let set = spec.set.is_some();
        let reset = spec.reset.is_some();
        let preset = spec.preset.is_some();
        let clear = spec.clear.is_some();
        let kind = match (enable, set, reset, preset, clear) {
            (false, false, false, false, false) => RegKind::Reg,
            (false, true, false, false, false) => RegKind::RegS,
            (false, false, true, false, false) => RegKind::RegR,
            (false, true, true, false, false) => RegKind::RegRS,
            (true, false, false, false, false) => RegKind::RegE,
            (true, true, false, false, false) => RegKind::RegSE,
            (true, false, true, false, false) => RegKind::RegRE,
            (true, true, true, false, false) => RegKind::RegRSE,
            (false, false, false, true, false) => RegKind::RegP,
            (false, false, false, false, true) => RegKind::RegC,
            (true, false, false, true, false) => RegKind::RegPE,
            (true, false, false, false, true) => RegKind::RegCE,
            (false, false, false, true, true) => RegKind::RegCP,
            (true, false, false, true, true) => RegKind::RegCPE,
            _ => {
                let inputs: Vec<&str> = [
                    (enable, "enable"),
                    (set, "set"),
                    (reset, "reset"),
                    (preset, "preset"),
                    (clear, "clear"),
                ]
                .into_iter()
                .filter_map(|(present, name)| present.then_some(name))
                .collect();
                return Err(LowerError::UnknownRegConfiguration {
                    register: spec.result.name.clone(),
                    inputs: inputs.join(", "),
                });
            }
        };
        Ok(kind)
    }

    /// Template name, e.g. `REGRE`.
    pub fn name(self) -> &'static str {
        match self {
            RegKind::Reg => "REG",
            RegKind::RegS => "REGS",
            RegKind::RegR => "REGR",
            RegKind::RegRS => "REGRS",
            RegKind::RegE => "REGE",
            RegKind::RegSE => "REGSE",
            RegKind::RegRE => "REGRE",
            RegKind::RegRSE => "REGRSE",
            RegKind::RegP => "REGP",
            RegKind::RegC => "REGC",
            RegKind::RegPE => "REGPE",
            RegKind::RegCE => "REGCE",
            RegKind::RegCP => "REGCP",
            RegKind::RegCPE => "REGCPE",
        }
    }

    /// Whether the template samples preset or clear outside the clock edge.
    pub fn is_asynchronous(self) -> bool {
        matches!(
            self,
            RegKind::RegP
                | RegKind::RegC
                | RegKind::RegPE
                | RegKind::RegCE
                | RegKind::RegCP
                | RegKind::RegCPE
        )
    }
}

impl fmt::Display for RegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn control(block: &mut OpBlock, operand: &Operand, node: &str) -> LowerResult<Expr> {
    let signal = operand.resolve(node)?;
    block.consume(signal.consumed());
    Ok(signal.expr())
}

/// Lowers a register into a clocked `always` block driving `result`.
///
/// The generated `if`/`else if` chain checks, in order: clear, preset, set,
/// reset, enable. Reset and clear load the initial value (zero when there
/// is none); set and preset load its complement (all ones when there is
/// none).
pub fn lower_register(spec: &RegisterSpec, result: Net) -> LowerResult<OpBlock> {
    let kind = RegKind::infer(spec)?;
    let node = result.name().to_string();
    log::trace!("{node}: register template {kind}");
    let width = result.width();
    let reset_value = Literal::hex(spec.init.unwrap_or(0), width);
    let set_value = match spec.init {
        Some(_) => reset_value.complement(),
        None => Literal::ones(width),
    };
    let q = Expr::Net(result.clone());
    let load = |value: &Literal| Statement::non_blocking(q.clone(), Expr::Literal(value.clone()));

    let mut block = OpBlock::new();
    let clock = spec.clock.resolve(&node)?;
    let data = spec.data.resolve(&node)?;
    block.consume(clock.consumed());
    block.consume(data.consumed());
    let mut body = Statement::non_blocking(q.clone(), data.expr())?;

    if let Some(enable) = &spec.enable {
        body = Statement::if_else(control(&mut block, enable, &node)?, body, None);
    }
    if let Some(reset) = &spec.reset {
        let cond = control(&mut block, reset, &node)?;
        body = Statement::if_else(cond, load(&reset_value)?, Some(body));
    }
    if let Some(set) = &spec.set {
        let cond = control(&mut block, set, &node)?;
        body = Statement::if_else(cond, load(&set_value)?, Some(body));
    }
    let mut events = vec![clock.net.clone()];
    if let Some(preset) = &spec.preset {
        let signal = preset.resolve(&node)?;
        block.consume(signal.consumed());
        events.push(signal.net.clone());
        body = Statement::if_else(signal.expr(), load(&set_value)?, Some(body));
    }
    if let Some(clear) = &spec.clear {
        let signal = clear.resolve(&node)?;
        block.consume(signal.consumed());
        events.push(signal.net.clone());
        body = Statement::if_else(signal.expr(), load(&reset_value)?, Some(body));
    }

    block.push(Statement::always(
        EventControl::Posedge(events),
        Statement::Block(vec![body]),
    ));
    block.produce(&result);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_verilog::NetKind;

    fn spec() -> RegisterSpec {
        RegisterSpec::new(
            Operand::unsigned("q", 4),
            Operand::unsigned("d", 4),
            Operand::unsigned("clk", 1),
        )
    }

    fn bit(name: &str) -> Operand {
        Operand::unsigned(name, 1)
    }

    fn q() -> Net {
        Net::reg("q", 4)
    }

    #[test]
    fn every_supported_combination_has_one_template() {
        let combos = [
            (spec(), RegKind::Reg),
            (spec().with_set(bit("s")), RegKind::RegS),
            (spec().with_reset(bit("r")), RegKind::RegR),
            (spec().with_set(bit("s")).with_reset(bit("r")), RegKind::RegRS),
            (spec().with_enable(bit("e")), RegKind::RegE),
            (spec().with_enable(bit("e")).with_set(bit("s")), RegKind::RegSE),
            (spec().with_enable(bit("e")).with_reset(bit("r")), RegKind::RegRE),
            (
                spec().with_enable(bit("e")).with_set(bit("s")).with_reset(bit("r")),
                RegKind::RegRSE,
            ),
            (spec().with_preset(bit("p")), RegKind::RegP),
            (spec().with_clear(bit("c")), RegKind::RegC),
            (spec().with_enable(bit("e")).with_preset(bit("p")), RegKind::RegPE),
            (spec().with_enable(bit("e")).with_clear(bit("c")), RegKind::RegCE),
            (spec().with_preset(bit("p")).with_clear(bit("c")), RegKind::RegCP),
            (
                spec().with_enable(bit("e")).with_preset(bit("p")).with_clear(bit("c")),
                RegKind::RegCPE,
            ),
        ];
        assert_eq!(combos.len(), RegKind::ALL.len());
        for (s, expected) in combos {
            assert_eq!(RegKind::infer(&s).unwrap(), expected);
        }
    }

    #[test]
    fn mixed_sync_and_async_is_rejected() {
        let err = RegKind::infer(&spec().with_set(bit("s")).with_clear(bit("c"))).unwrap_err();
        assert_eq!(
            err,
            LowerError::UnknownRegConfiguration {
                register: "q".into(),
                inputs: "set, clear".into()
            }
        );
        assert!(lower_register(&spec().with_reset(bit("r")).with_preset(bit("p")), q()).is_err());
    }

    #[test]
    fn reset_with_enable_and_init() {
        let s = spec().with_reset(bit("rst")).with_enable(bit("en")).with_init(0xF);
        let block = lower_register(&s, q()).unwrap();
        assert_eq!(
            block.to_string(),
            "always @(posedge clk) begin\nif (rst) q <= 4'hF;\nelse if (en) q <= d;\nend\n"
        );
        let consumed: Vec<_> = block.consumed().iter().map(|n| n.name()).collect();
        assert_eq!(consumed, ["clk", "d", "en", "rst"]);
        assert_eq!(block.produced().len(), 1);
    }

    #[test]
    fn set_is_checked_before_reset() {
        let s = spec().with_set(bit("s")).with_reset(bit("r")).with_init(0x5);
        let block = lower_register(&s, q()).unwrap();
        assert_eq!(
            block.to_string(),
            "always @(posedge clk) begin\nif (s) q <= 4'hA;\nelse if (r) q <= 4'h5;\nelse q <= d;\nend\n"
        );
    }

    #[test]
    fn defaults_without_init() {
        let block = lower_register(&spec().with_set(bit("s")), q()).unwrap();
        assert!(block.to_string().contains("if (s) q <= 4'hF;"));
        let block = lower_register(&spec().with_reset(bit("r")), q()).unwrap();
        assert!(block.to_string().contains("if (r) q <= 4'h0;"));
    }

    #[test]
    fn asynchronous_controls_join_the_sensitivity_list() {
        let s = spec()
            .with_enable(bit("en"))
            .with_preset(bit("pre"))
            .with_clear(bit("clr"));
        let block = lower_register(&s, q()).unwrap();
        assert_eq!(
            block.to_string(),
            "always @(posedge clk or posedge pre or posedge clr) begin\n\
             if (clr) q <= 4'h0;\n\
             else if (pre) q <= 4'hF;\n\
             else if (en) q <= d;\n\
             end\n"
        );
        assert!(RegKind::RegCPE.is_asynchronous());
        assert!(!RegKind::RegRSE.is_asynchronous());
    }

    #[test]
    fn plain_register() {
        let block = lower_register(&spec(), q()).unwrap();
        assert_eq!(block.to_string(), "always @(posedge clk) begin\nq <= d;\nend\n");
        assert_eq!(*block.produced()[0].kind(), NetKind::Reg);
    }

    #[test]
    fn names() {
        assert_eq!(RegKind::RegRSE.to_string(), "REGRSE");
        let names: Vec<_> = RegKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), 14);
        assert!(names.iter().all(|n| n.starts_with("REG")));
    }
}
