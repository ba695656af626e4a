//! Encoded multiplexers.

use crate::block::OpBlock;
use crate::error::{LowerError, LowerResult};
use crate::node::Operand;
use forge_common::{Logic, LogicVec};
use forge_verilog::{CaseArm, EventControl, Expr, Literal, Net, Radix, Statement};

/// Lowers `result = inputs[select]`.
///
/// Two inputs become a continuous `select ? in1 : in0`. More inputs become
/// an `always @(*)` block with one `case` arm per input and a `default`
/// that drives x, so `result` must be a `reg`.
pub fn lower_mux(select: &Operand, inputs: &[Operand], result: Net) -> LowerResult<OpBlock> {
    let node = result.name().to_string();
    let sel = select.resolve(&node)?;
    let addressable = 1u64.checked_shl(sel.width()).unwrap_or(u64::MAX);
    if inputs.len() < 2 || inputs.len() as u64 > addressable {
        return Err(LowerError::MuxArity {
            result: node,
            inputs: inputs.len(),
            select_width: sel.width(),
        });
    }
    let signals = inputs
        .iter()
        .map(|i| i.resolve(&node))
        .collect::<LowerResult<Vec<_>>>()?;

    let mut block = OpBlock::new();
    block.consume(sel.consumed());
    for s in &signals {
        block.consume(s.consumed());
    }

    if let [zero, one] = signals.as_slice() {
        let value = Expr::conditional(sel.expr(), one.expr(), zero.expr())?;
        block.push(Statement::continuous(result.clone(), value)?);
    } else {
        let arms = signals
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Ok(CaseArm {
                    labels: vec![Expr::Literal(Literal::decimal(i as u64, sel.width()))],
                    body: Statement::blocking(result.clone(), s.expr())?,
                })
            })
            .collect::<LowerResult<Vec<_>>>()?;
        let mut unknown = LogicVec::new(result.width());
        for i in 0..result.width() {
            unknown.set(i, Logic::X);
        }
        let default = Statement::blocking(
            result.clone(),
            Expr::Literal(Literal::from_bits(&unknown, Radix::Hex)),
        )?;
        let case = Statement::Case {
            selector: sel.expr(),
            arms,
            default: Some(Box::new(default)),
        };
        block.push(Statement::always(EventControl::Any, case));
    }
    block.produce(&result);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> Vec<Operand> {
        (0..n).map(|i| Operand::unsigned(format!("d{i}"), 4)).collect()
    }

    #[test]
    fn two_inputs_are_a_ternary() {
        let block = lower_mux(&Operand::unsigned("s", 1), &data(2), Net::wire("y", 4)).unwrap();
        assert_eq!(block.to_string(), "assign y = s ? d1 : d0;\n");
        assert_eq!(block.consumed().len(), 3);
    }

    #[test]
    fn wider_select_on_two_inputs() {
        let block = lower_mux(&Operand::unsigned("s", 2), &data(2), Net::wire("y", 4)).unwrap();
        assert_eq!(block.to_string(), "assign y = s != 2'h0 ? d1 : d0;\n");
    }

    #[test]
    fn more_inputs_are_a_case() {
        let block = lower_mux(&Operand::unsigned("s", 2), &data(3), Net::reg("y", 4)).unwrap();
        assert_eq!(
            block.to_string(),
            "always @(*) case (s)\n\
             2'd0: y = d0;\n\
             2'd1: y = d1;\n\
             2'd2: y = d2;\n\
             default: y = 4'hx;\n\
             endcase\n"
        );
    }

    #[test]
    fn arity_is_checked() {
        let err = lower_mux(&Operand::unsigned("s", 1), &data(3), Net::reg("y", 4)).unwrap_err();
        assert_eq!(
            err,
            LowerError::MuxArity {
                result: "y".into(),
                inputs: 3,
                select_width: 1
            }
        );
        assert!(lower_mux(&Operand::unsigned("s", 1), &data(1), Net::wire("y", 4)).is_err());
    }
}
