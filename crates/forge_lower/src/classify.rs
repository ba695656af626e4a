//! Picks the net kind that carries a node's result.

use crate::error::LowerResult;
use crate::node::OpNode;
use forge_verilog::{Literal, Net, NetKind};

/// Builds the result net of `node`.
///
/// Registers drive a `reg` carrying their initial value. An encoded mux with
/// two inputs is a continuous ternary and drives a `wire`; a wider mux is a
/// combinational `case` and drives a `reg`. Everything else drives a `wire`.
pub fn classify_result_net(node: &OpNode) -> LowerResult<Net> {
    let result = node.result();
    let signal = result.resolve(&result.name)?;
    let net = signal.net;
    Ok(match node {
        OpNode::Register(spec) => {
            let reg = net.clone().with_kind(NetKind::Reg);
            match spec.init {
                Some(init) => reg.with_init(Literal::hex(init, net.width())),
                None => reg,
            }
        }
        OpNode::EncodedMux { inputs, .. } if inputs.len() > 2 => {
            net.with_kind(NetKind::Reg)
        }
        OpNode::EncodedMux { .. }
        | OpNode::Binary { .. }
        | OpNode::Multiply { .. }
        | OpNode::Compare { .. }
        | OpNode::Unary { .. }
        | OpNode::Shift { .. } => net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ArithOp, Operand, RegisterSpec};

    fn mux(inputs: usize) -> OpNode {
        OpNode::EncodedMux {
            select: Operand::unsigned("sel", 2),
            inputs: (0..inputs)
                .map(|i| Operand::unsigned(format!("in{i}"), 8))
                .collect(),
            result: Operand::unsigned("y", 8),
        }
    }

    #[test]
    fn register_is_reg_with_init() {
        let node = OpNode::Register(
            RegisterSpec::new(
                Operand::unsigned("q", 4),
                Operand::unsigned("d", 4),
                Operand::unsigned("clk", 1),
            )
            .with_init(0xA),
        );
        let net = classify_result_net(&node).unwrap();
        assert_eq!(*net.kind(), NetKind::Reg);
        assert_eq!(net.init().map(|l| l.text()), Some("4'hA".to_string()));
    }

    #[test]
    fn mux_kind_depends_on_arity() {
        assert_eq!(*classify_result_net(&mux(2)).unwrap().kind(), NetKind::Wire);
        assert_eq!(*classify_result_net(&mux(3)).unwrap().kind(), NetKind::Reg);
    }

    #[test]
    fn arithmetic_is_wire() {
        let node = OpNode::Binary {
            op: ArithOp::Add,
            left: Operand::signed("a", 8),
            right: Operand::signed("b", 8),
            result: Operand::signed("s", 9),
        };
        let net = classify_result_net(&node).unwrap();
        assert_eq!(*net.kind(), NetKind::Wire);
        assert!(net.is_signed());
        assert_eq!(net.width(), 9);
    }

    #[test]
    fn unresolved_result_fails() {
        let node = OpNode::Multiply {
            left: Operand::unsigned("a", 8),
            right: Operand::unsigned("b", 8),
            result: Operand::unresolved("p"),
        };
        assert!(classify_result_net(&node).is_err());
    }
}
