//! Shift lowering: constant shifts as rewiring, variable shifts as a
//! logarithmic selector network.
//!
//! The shifted value is handled as a list of bit sources, least significant
//! first. Shifting moves sources around; rendering merges runs of adjacent
//! bits of one net into part selects, runs of one repeated bit into a
//! replication, and runs of constant bits into a literal.

use crate::block::OpBlock;
use crate::error::{LowerError, LowerResult};
use crate::node::{Operand, ShiftKind, Signal};
use forge_common::{Logic, LogicVec};
use forge_verilog::{Expr, Literal, Net, Radix, Statement};

#[derive(Debug, Clone, PartialEq)]
enum Bit {
    Net(Net, u32),
    Const(bool),
}

/// Bits of `signal` widened to `width`, filling with the sign bit when
/// `sign_fill` is set and with zeros otherwise.
fn source_bits(signal: &Signal, width: u32, sign_fill: bool) -> Vec<Bit> {
    let own = signal.width();
    let mut bits: Vec<Bit> = (0..own)
        .map(|i| match signal.constant {
            Some(v) => Bit::Const(i < 64 && (v >> i) & 1 == 1),
            None => Bit::Net(signal.net.clone(), i),
        })
        .collect();
    let fill = if sign_fill {
        bits[own as usize - 1].clone()
    } else {
        Bit::Const(false)
    };
    bits.resize(width.max(own) as usize, fill);
    bits
}

fn net_bits(net: &Net) -> Vec<Bit> {
    (0..net.width()).map(|i| Bit::Net(net.clone(), i)).collect()
}

/// Shifts `bits` by `amount` positions. Amounts at or beyond the width give
/// all zeros, or all copies of the top bit for arithmetic shifts.
fn shift_bits(bits: &[Bit], kind: ShiftKind, amount: u64) -> Vec<Bit> {
    let len = bits.len();
    let sign = bits[len - 1].clone();
    (0..len)
        .map(|i| {
            let i = i as u64;
            match kind {
                ShiftKind::Left => match i.checked_sub(amount) {
                    Some(src) => bits[src as usize].clone(),
                    None => Bit::Const(false),
                },
                ShiftKind::RightLogical | ShiftKind::RightArithmetic => {
                    match i.checked_add(amount).filter(|src| *src < len as u64) {
                        Some(src) => bits[src as usize].clone(),
                        None if kind == ShiftKind::RightArithmetic => sign.clone(),
                        None => Bit::Const(false),
                    }
                }
            }
        })
        .collect()
}

fn const_literal(run: &[Bit]) -> Literal {
    let mut vec = LogicVec::new(run.len() as u32);
    for (i, bit) in run.iter().enumerate() {
        if let Bit::Const(true) = bit {
            vec.set(i as u32, Logic::One);
        }
    }
    Literal::from_bits(&vec, Radix::Hex)
}

/// Renders bit sources (least significant first) as one expression.
fn bits_to_expr(bits: &[Bit]) -> LowerResult<Expr> {
    let mut parts = Vec::new();
    let mut top = bits.len();
    while top > 0 {
        let mut low = top - 1;
        let part = match &bits[low] {
            Bit::Const(_) => {
                while low > 0 && matches!(bits[low - 1], Bit::Const(_)) {
                    low -= 1;
                }
                Expr::Literal(const_literal(&bits[low..top]))
            }
            Bit::Net(net, msb) => {
                let mut lsb = *msb;
                while low > 0 && lsb > 0 && bits[low - 1] == Bit::Net(net.clone(), lsb - 1) {
                    low -= 1;
                    lsb -= 1;
                }
                if lsb != *msb {
                    if lsb == 0 && *msb == net.width() - 1 {
                        Expr::Net(net.clone())
                    } else {
                        net.range(*msb, lsb)?
                    }
                } else {
                    while low > 0 && bits[low - 1] == bits[top - 1] {
                        low -= 1;
                    }
                    let bit = net.bit(*msb)?;
                    match (top - low) as u32 {
                        1 => bit,
                        count => Expr::replicate(count, bit),
                    }
                }
            }
        };
        parts.push(part);
        top = low;
    }
    Ok(match parts.len() {
        1 => parts.remove(0),
        _ => Expr::concat(parts),
    })
}

/// Lowers a shift of `operand` by `amount` into `result`.
///
/// A constant amount rewires bits directly. A variable amount of `N` bits
/// builds `N` stages; stage `i` (from 1) shifts by `1 << (N - i)` when bit
/// `N - i` of the amount is set. Every stage but the last drives a
/// `<result>_stage_<i>` wire, and the last drives the result. Fails with
/// [`LowerError::StageOverflow`] when `N` exceeds `max_stages`.
pub fn lower_shift(
    kind: ShiftKind,
    operand: &Operand,
    amount: &Operand,
    result: Net,
    max_stages: u32,
) -> LowerResult<OpBlock> {
    let node = result.name().to_string();
    if amount.value.is_some_and(|v| v.width == 0) {
        return Err(LowerError::ShiftByZero { result: node });
    }
    let value = operand.resolve(&node)?;
    let amount = amount.resolve(&node)?;
    let width = value.width().max(result.width());
    let sign_fill = value.signed || kind == ShiftKind::RightArithmetic;
    let source = source_bits(&value, width, sign_fill);
    let keep = result.width() as usize;

    let mut block = OpBlock::new();
    block.consume(value.consumed());
    block.consume(amount.consumed());

    if let Some(k) = amount.constant {
        log::trace!("{node}: constant shift by {k}");
        let shifted = shift_bits(&source, kind, k);
        block.push(Statement::continuous(
            result.clone(),
            bits_to_expr(&shifted[..keep])?,
        )?);
        block.produce(&result);
        return Ok(block);
    }

    let stages = amount.width();
    if stages > max_stages {
        return Err(LowerError::StageOverflow {
            result: node,
            stages,
            max: max_stages,
        });
    }
    log::trace!("{node}: {stages}-stage shift network");
    let mut prev = source;
    for i in 1..=stages {
        let select = amount.net.bit(stages - i)?;
        let granularity = 1u64.checked_shl(stages - i).unwrap_or(u64::MAX);
        let shifted = shift_bits(&prev, kind, granularity);
        if i == stages {
            let value = Expr::conditional(
                select,
                bits_to_expr(&shifted[..keep])?,
                bits_to_expr(&prev[..keep])?,
            )?;
            block.push(Statement::continuous(result.clone(), value)?);
            block.produce(&result);
        } else {
            let stage = Net::wire(format!("{node}_stage_{i}"), width);
            let value = Expr::conditional(select, bits_to_expr(&shifted)?, bits_to_expr(&prev)?)?;
            block.push(Statement::continuous(stage.clone(), value)?);
            block.produce(&stage);
            prev = net_bits(&stage);
        }
    }
    Ok(block)
}
