//! Shim-and-assign lowering for binary, multiply, compare and unary nodes.
//!
//! A two-operand node becomes two shim wires, each holding one operand
//! extended to a common width according to its own signedness, and one
//! continuous assignment applying the operator to the shims. When the
//! result is narrower than the operator's output a `<result>_full` wire
//! holds the full value and the result takes its low bits.

use crate::block::OpBlock;
use crate::error::{LowerResult, P001};
use crate::node::{ArithOp, CompareOp, Operand, Signal};
use forge_config::RelationalCompare;
use forge_diagnostics::Diagnostic;
use forge_verilog::{BinaryOp, Expr, Literal, Net, Statement, UnaryOp};

/// Extends `signal` to `size` bits: sign-extends signed operands and
/// zero-extends unsigned ones. Constants are folded into a literal.
pub(crate) fn extend(signal: &Signal, size: u32) -> LowerResult<Expr> {
    let width = signal.width();
    if let Some(value) = signal.constant {
        let negative = signal.signed && width < 64 && (value >> (width - 1)) & 1 == 1;
        let value = if negative {
            value | (u64::MAX << width)
        } else {
            value
        };
        return Ok(Expr::Literal(Literal::hex(value, size)));
    }
    if size <= width {
        return Ok(Expr::Net(signal.net.clone()));
    }
    let pad = size - width;
    let fill = if signal.signed {
        let sign = signal.net.bit(width - 1)?;
        if pad == 1 {
            sign
        } else {
            Expr::replicate(pad, sign)
        }
    } else {
        Expr::Literal(Literal::zero(pad))
    };
    Ok(Expr::concat(vec![fill, Expr::Net(signal.net.clone())]))
}

fn shim_net(result: &Net, side: char, signed: bool, size: u32) -> Net {
    let tag = if signed { "signed" } else { "unsigned" };
    Net::wire(format!("{}_{side}_{tag}", result.name()), size).with_signed(signed)
}

/// Drives `result` from `value`, going through `<result>_full` when the
/// result is narrower.
fn drive(block: &mut OpBlock, result: &Net, value: Expr) -> LowerResult<()> {
    let width = value.width();
    if result.width() >= width {
        block.push(Statement::continuous(result.clone(), value)?);
    } else {
        let full = Net::wire(format!("{}_full", result.name()), width)
            .with_signed(result.is_signed());
        block.push(Statement::continuous(full.clone(), value)?);
        block.push(Statement::continuous(
            result.clone(),
            full.range(result.width() - 1, 0)?,
        )?);
        block.produce(&full);
    }
    block.produce(result);
    Ok(())
}

struct Shims {
    left: Net,
    right: Net,
}

/// Emits both shim assignments and records the operands as consumed.
/// `force_signed` declares both shims signed regardless of the operands.
fn shim_pair(
    block: &mut OpBlock,
    result: &Net,
    left: &Signal,
    right: &Signal,
    size: u32,
    force_signed: bool,
) -> LowerResult<Shims> {
    let a = shim_net(result, 'a', force_signed || left.signed, size);
    let b = shim_net(result, 'b', force_signed || right.signed, size);
    block.push(Statement::continuous(a.clone(), extend(left, size)?)?);
    block.push(Statement::continuous(b.clone(), extend(right, size)?)?);
    block.consume(left.consumed());
    block.consume(right.consumed());
    block.produce(&a);
    block.produce(&b);
    Ok(Shims { left: a, right: b })
}

/// Lowers `result = left op right` through `max(lw, rw)`-bit shims.
pub fn lower_binary(
    op: ArithOp,
    left: &Operand,
    right: &Operand,
    result: Net,
) -> LowerResult<OpBlock> {
    let node = result.name().to_string();
    let (l, r) = (left.resolve(&node)?, right.resolve(&node)?);
    let size = l.width().max(r.width());
    let mut block = OpBlock::new();
    let shims = shim_pair(&mut block, &result, &l, &r, size, false)?;
    let value = Expr::binary(op.binary_op(), Expr::Net(shims.left), Expr::Net(shims.right))?;
    drive(&mut block, &result, value)?;
    Ok(block)
}

/// Lowers `result = left * right`. The shims are as wide as the widest of
/// the operands and the result, so the product is computed at full width.
pub fn lower_multiply(left: &Operand, right: &Operand, result: Net) -> LowerResult<OpBlock> {
    let node = result.name().to_string();
    let (l, r) = (left.resolve(&node)?, right.resolve(&node)?);
    let size = l.width().max(r.width()).max(result.width());
    let mut block = OpBlock::new();
    let shims = shim_pair(&mut block, &result, &l, &r, size, false)?;
    let value = Expr::binary(BinaryOp::Mul, Expr::Net(shims.left), Expr::Net(shims.right))?;
    drive(&mut block, &result, value)?;
    Ok(block)
}

/// Lowers a comparison.
///
/// Under [`RelationalCompare::Signed`], `<=` and `>=` are emitted on signed
/// shims. Unsigned operands are zero-extended by one extra bit first so the
/// signed compare sees the same numbers, and a `P001` note is attached.
pub fn lower_compare(
    op: CompareOp,
    left: &Operand,
    right: &Operand,
    result: Net,
    policy: RelationalCompare,
) -> LowerResult<OpBlock> {
    let node = result.name().to_string();
    let (l, r) = (left.resolve(&node)?, right.resolve(&node)?);
    let mut size = l.width().max(r.width());
    let force_signed = policy == RelationalCompare::Signed && op.is_inclusive_relation();
    let mut block = OpBlock::new();
    if force_signed && !(l.signed && r.signed) {
        size += 1;
        log::debug!("{node}: signed compare policy applied to unsigned data");
        block.note(
            Diagnostic::note(P001, "unsigned operands compared with a signed relational operator")
                .with_construct(format!("net `{node}`"))
                .with_note(format!("operands are zero-extended to {size} bits first")),
        );
    }
    let shims = shim_pair(&mut block, &result, &l, &r, size, force_signed)?;
    let value = Expr::binary(op.binary_op(), Expr::Net(shims.left), Expr::Net(shims.right))?;
    drive(&mut block, &result, value)?;
    Ok(block)
}

/// Lowers `result = op operand` with no shims.
pub fn lower_unary(op: UnaryOp, operand: &Operand, result: Net) -> LowerResult<OpBlock> {
    let signal = operand.resolve(result.name())?;
    let mut block = OpBlock::new();
    block.consume(signal.consumed());
    drive(&mut block, &result, Expr::unary(op, signal.expr()))?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LowerError;

    fn render(block: &OpBlock) -> Vec<String> {
        block.statements().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_of_equal_widths() {
        let block = lower_binary(
            ArithOp::Add,
            &Operand::unsigned("a", 8),
            &Operand::unsigned("b", 8),
            Net::wire("sum", 8),
        )
        .unwrap();
        assert_eq!(
            render(&block),
            [
                "assign sum_a_unsigned = a;\n",
                "assign sum_b_unsigned = b;\n",
                "assign sum = sum_a_unsigned + sum_b_unsigned;\n",
            ]
        );
        let names: Vec<_> = block.produced().iter().map(|n| n.name()).collect();
        assert_eq!(names, ["sum_a_unsigned", "sum_b_unsigned", "sum"]);
        assert_eq!(block.consumed().len(), 2);
    }

    #[test]
    fn mixed_widths_are_extended() {
        let block = lower_binary(
            ArithOp::Sub,
            &Operand::signed("a", 4),
            &Operand::unsigned("b", 8),
            Net::wire("d", 8),
        )
        .unwrap();
        assert_eq!(block.statements()[0].to_string(), "assign d_a_signed = {{4{a[3]}}, a};\n");
        assert_eq!(block.statements()[1].to_string(), "assign d_b_unsigned = b;\n");
        assert!(block.produced()[0].is_signed());
    }

    #[test]
    fn single_bit_pad_uses_the_sign_bit() {
        let s = Operand::signed("a", 7).resolve("x").unwrap();
        assert_eq!(extend(&s, 8).unwrap().to_string(), "{a[6], a}");
        let u = Operand::unsigned("b", 5).resolve("x").unwrap();
        assert_eq!(extend(&u, 8).unwrap().to_string(), "{3'h0, b}");
    }

    #[test]
    fn negative_constant_is_sign_extended() {
        let k = Operand::constant("k", 0xE, 4, true).resolve("x").unwrap();
        assert_eq!(extend(&k, 8).unwrap().to_string(), "8'hFE");
        let k = Operand::constant("k", 0xE, 4, false).resolve("x").unwrap();
        assert_eq!(extend(&k, 8).unwrap().to_string(), "8'hE");
    }

    #[test]
    fn narrow_result_goes_through_full() {
        let block = lower_binary(
            ArithOp::And,
            &Operand::unsigned("a", 8),
            &Operand::unsigned("b", 8),
            Net::wire("lo", 4),
        )
        .unwrap();
        let text = render(&block);
        assert_eq!(text[2], "assign lo_full = lo_a_unsigned & lo_b_unsigned;\n");
        assert_eq!(text[3], "assign lo = lo_full[3:0];\n");
        assert_eq!(block.produced().len(), 4);
    }

    #[test]
    fn multiply_shims_match_product_width() {
        let block = lower_multiply(
            &Operand::unsigned("a", 4),
            &Operand::unsigned("b", 4),
            Net::wire("p", 8),
        )
        .unwrap();
        assert_eq!(
            render(&block),
            [
                "assign p_a_unsigned = {4'h0, a};\n",
                "assign p_b_unsigned = {4'h0, b};\n",
                "assign p = p_a_unsigned * p_b_unsigned;\n",
            ]
        );
    }

    #[test]
    fn signed_policy_widens_unsigned_operands() {
        let block = lower_compare(
            CompareOp::Le,
            &Operand::unsigned("a", 8),
            &Operand::unsigned("b", 8),
            Net::wire("le", 1),
            RelationalCompare::Signed,
        )
        .unwrap();
        assert_eq!(
            render(&block),
            [
                "assign le_a_signed = {1'h0, a};\n",
                "assign le_b_signed = {1'h0, b};\n",
                "assign le = le_a_signed <= le_b_signed;\n",
            ]
        );
        assert_eq!(block.notes().len(), 1);
        assert_eq!(block.notes()[0].code, P001);
        assert!(block.produced().iter().take(2).all(|n| n.is_signed() && n.width() == 9));
    }

    #[test]
    fn native_policy_keeps_operand_signedness() {
        let block = lower_compare(
            CompareOp::Ge,
            &Operand::unsigned("a", 8),
            &Operand::unsigned("b", 8),
            Net::wire("ge", 1),
            RelationalCompare::Native,
        )
        .unwrap();
        assert_eq!(block.statements()[0].to_string(), "assign ge_a_unsigned = a;\n");
        assert!(block.notes().is_empty());
    }

    #[test]
    fn strict_compares_ignore_the_policy() {
        let block = lower_compare(
            CompareOp::Lt,
            &Operand::unsigned("a", 8),
            &Operand::unsigned("b", 8),
            Net::wire("lt", 1),
            RelationalCompare::Signed,
        )
        .unwrap();
        assert!(block.notes().is_empty());
        assert!(!block.produced()[0].is_signed());
    }

    #[test]
    fn signed_operands_need_no_widening() {
        let block = lower_compare(
            CompareOp::Ge,
            &Operand::signed("a", 8),
            &Operand::signed("b", 8),
            Net::wire("ge", 1),
            RelationalCompare::Signed,
        )
        .unwrap();
        assert!(block.notes().is_empty());
        assert_eq!(block.produced()[0].width(), 8);
    }

    #[test]
    fn unary_has_no_shims() {
        let block = lower_unary(UnaryOp::ReduceXor, &Operand::unsigned("v", 8), Net::wire("p", 1))
            .unwrap();
        assert_eq!(render(&block), ["assign p = ^v;\n"]);
        let block = lower_unary(UnaryOp::Complement, &Operand::unsigned("v", 8), Net::wire("n", 8))
            .unwrap();
        assert_eq!(render(&block), ["assign n = ~v;\n"]);
    }

    #[test]
    fn missing_operand_value_is_fatal() {
        let err = lower_binary(
            ArithOp::Add,
            &Operand::unresolved("a"),
            &Operand::unsigned("b", 8),
            Net::wire("s", 8),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LowerError::MissingOperandValue {
                node: "s".into(),
                operand: "a".into()
            }
        );
    }

    #[test]
    fn constant_operands_are_not_consumed() {
        let block = lower_binary(
            ArithOp::Xor,
            &Operand::unsigned("a", 8),
            &Operand::constant("mask", 0x0F, 8, false),
            Net::wire("x", 8),
        )
        .unwrap();
        assert_eq!(block.statements()[1].to_string(), "assign x_b_unsigned = 8'hF;\n");
        assert_eq!(block.consumed().len(), 1);
    }

    #[test]
    fn narrow_unary_result_truncates() {
        let block =
            lower_unary(UnaryOp::Negate, &Operand::unsigned("a", 8), Net::wire("n", 4)).unwrap();
        assert_eq!(
            render(&block),
            ["assign n_full = -a;\n", "assign n = n_full[3:0];\n"]
        );
    }

    #[test]
    fn zero_width_operand_is_rejected() {
        let err = lower_binary(
            ArithOp::Or,
            &Operand::unsigned("a", 0),
            &Operand::unsigned("b", 8),
            Net::wire("o", 8),
        )
        .unwrap_err();
        assert!(matches!(err, LowerError::ZeroWidth { .. }));
    }
}
