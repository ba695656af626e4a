//! A two-state reference evaluator for generated modules.
//!
//! Values are at most 64 bits wide and carry no x or z. Continuous
//! assignments and `always @(*)` blocks are re-run until nothing changes;
//! clocked blocks run on an explicit [`Evaluator::posedge`] with
//! non-blocking updates applied after every triggered block has run.
//!
//! Selects are read the way a simulator reads the emitted text: the index
//! as written is resolved against the direction the net is declared with.

use forge_verilog::{
    AssignKind, BinaryOp, EventControl, Expr, Module, Net, NetKind, Range, Statement, UnaryOp,
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Result alias for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Why an expression or statement could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A net was read before anything drove it.
    #[error("net `{0}` has no value")]
    Unassigned(String),
    /// A value wider than 64 bits.
    #[error("{0}-bit values are not supported")]
    TooWide(u32),
    /// A literal with x or z bits.
    #[error("literal `{0}` has unknown bits")]
    Unknown(String),
    /// Division or modulus by zero.
    #[error("division by zero")]
    DivideByZero,
    /// A construct the evaluator does not model.
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    /// Combinational logic kept changing.
    #[error("combinational logic did not settle after {0} passes")]
    NoConvergence(usize),
}

/// An evaluated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    /// Bits, zero above `width`.
    pub bits: u64,
    /// Self-determined width.
    pub width: u32,
    /// Two's-complement interpretation.
    pub signed: bool,
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn sext(bits: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        bits as i64
    } else {
        ((bits << (64 - width)) as i64) >> (64 - width)
    }
}

impl Value {
    fn new(bits: u64, width: u32, signed: bool) -> EvalResult<Self> {
        if width > 64 {
            return Err(EvalError::TooWide(width));
        }
        Ok(Self {
            bits: bits & mask(width),
            width,
            signed,
        })
    }

    fn flag(b: bool) -> Self {
        Self {
            bits: b as u64,
            width: 1,
            signed: false,
        }
    }

    /// Bits extended to `width` by this value's signedness.
    fn extended(self, width: u32, signed: bool) -> u64 {
        if signed {
            sext(self.bits, self.width) as u64 & mask(width)
        } else {
            self.bits
        }
    }
}

#[derive(Clone, Copy)]
enum Process<'m> {
    Combinational(&'m Statement),
    Clocked(&'m [Net], &'m Statement),
}

fn collect_processes<'m>(stmt: &'m Statement, out: &mut Vec<Process<'m>>) {
    match stmt {
        Statement::List(stmts) => stmts.iter().for_each(|s| collect_processes(s, out)),
        Statement::Always {
            events: EventControl::Posedge(nets),
            body,
        } => out.push(Process::Clocked(nets, body)),
        Statement::Always {
            events: EventControl::Any,
            body,
        } => out.push(Process::Combinational(body)),
        Statement::Assign {
            kind: AssignKind::Continuous,
            ..
        } => out.push(Process::Combinational(stmt)),
        _ => {}
    }
}

/// Evaluates the statements of one module.
pub struct Evaluator<'m> {
    processes: Vec<Process<'m>>,
    values: HashMap<String, u64>,
    ascending: HashSet<String>,
    changed: bool,
}

impl<'m> Evaluator<'m> {
    /// Loads `module`; nets with a declared initial value start with it.
    pub fn new(module: &'m Module) -> Self {
        let mut processes = Vec::new();
        for stmt in module.statements() {
            collect_processes(stmt, &mut processes);
        }
        let values = module
            .declarations()
            .iter()
            .flat_map(|d| d.nets())
            .filter_map(|n| Some((n.name().to_string(), n.init()?.as_u64()?)))
            .collect();
        let ascending = module
            .declarations()
            .iter()
            .filter(|d| d.is_reversed())
            .flat_map(|d| d.nets())
            .map(|n| n.name().to_string())
            .collect();
        Self {
            processes,
            values,
            ascending,
            changed: false,
        }
    }

    /// Drives `name` from outside.
    pub fn set(&mut self, name: &str, value: u64) {
        self.values.insert(name.to_string(), value);
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Re-runs combinational logic until no net changes.
    pub fn settle(&mut self) -> EvalResult<()> {
        let passes = self.processes.len() + 2;
        for _ in 0..passes {
            self.changed = false;
            let mut pending_read = None;
            let mut queue = Vec::new();
            for i in 0..self.processes.len() {
                let Process::Combinational(stmt) = self.processes[i] else {
                    continue;
                };
                match self.exec(stmt, &mut queue) {
                    Ok(()) => {}
                    Err(EvalError::Unassigned(name)) => pending_read = Some(name),
                    Err(err) => return Err(err),
                }
            }
            if !self.changed {
                return match pending_read {
                    Some(name) => Err(EvalError::Unassigned(name)),
                    None => Ok(()),
                };
            }
        }
        Err(EvalError::NoConvergence(passes))
    }

    /// Runs every clocked block sensitive to a rising edge of `clock`, then
    /// settles.
    pub fn posedge(&mut self, clock: &str) -> EvalResult<()> {
        self.settle()?;
        let mut queue = Vec::new();
        for i in 0..self.processes.len() {
            let Process::Clocked(events, body) = self.processes[i] else {
                continue;
            };
            if events.iter().any(|n| n.name() == clock) {
                self.exec(body, &mut queue)?;
            }
        }
        for (target, value) in queue {
            self.write(&target, value)?;
        }
        self.settle()
    }

    /// Bit of `net` a select of logical bit `index` reaches as written.
    fn declared_bit(&self, net: &Net, index: u32) -> u32 {
        let written = net.written_index(index);
        if self.ascending.contains(net.name()) {
            net.width().saturating_sub(1).saturating_sub(written)
        } else {
            written
        }
    }

    fn declared_range(&self, net: &Net, range: Range) -> Range {
        let written = if net.is_ascending() {
            range.mirrored(net.width())
        } else {
            range
        };
        if self.ascending.contains(net.name()) {
            written.mirrored(net.width())
        } else {
            written
        }
    }

    fn read(&self, net: &Net) -> EvalResult<Value> {
        let bits = self
            .values
            .get(net.name())
            .copied()
            .ok_or_else(|| EvalError::Unassigned(net.name().to_string()))?;
        Value::new(bits, net.width(), net.is_signed())
    }

    /// Evaluates `expr` at its self-determined width.
    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Net(net) => self.read(net),
            Expr::Literal(lit) => {
                let bits = lit.as_u64().ok_or_else(|| EvalError::Unknown(lit.text()))?;
                Value::new(bits, lit.width(), false)
            }
            Expr::BitSelect { net, index } => {
                let v = self.read(net)?;
                let bit = self.declared_bit(net, *index);
                Ok(Value::flag((v.bits >> bit) & 1 == 1))
            }
            Expr::PartSelect { net, range } => {
                let v = self.read(net)?;
                let range = self.declared_range(net, *range);
                Value::new(v.bits >> range.lsb(), range.width(), false)
            }
            Expr::Index { net, index } => {
                if matches!(net.kind(), NetKind::Memory { .. }) {
                    return Err(EvalError::Unsupported(format!("memory `{}`", net.name())));
                }
                let v = self.read(net)?;
                let i = self.eval(index)?.bits;
                Ok(Value::flag(i < 64 && (v.bits >> i) & 1 == 1))
            }
            Expr::Concat(parts) => {
                let mut bits = 0u64;
                let mut width = 0u32;
                for part in parts {
                    let v = self.eval(part)?;
                    width += v.width;
                    if width > 64 {
                        return Err(EvalError::TooWide(width));
                    }
                    bits = if v.width >= 64 { v.bits } else { (bits << v.width) | v.bits };
                }
                Value::new(bits, width, false)
            }
            Expr::Replicate { count, expr } => {
                let v = self.eval(expr)?;
                let width = count.saturating_mul(v.width);
                if width > 64 {
                    return Err(EvalError::TooWide(width));
                }
                let bits = (0..*count).fold(0u64, |acc, _| {
                    if v.width >= 64 {
                        v.bits
                    } else {
                        (acc << v.width) | v.bits
                    }
                });
                Value::new(bits, width, false)
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.bits != 0 {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Binary { op, left, right } => binary(*op, self.eval(left)?, self.eval(right)?),
            Expr::Unary { op, operand } => Ok(unary(*op, self.eval(operand)?)),
            Expr::Group(inner) => self.eval(inner),
        }
    }

    fn exec(&mut self, stmt: &Statement, queue: &mut Vec<(Expr, Value)>) -> EvalResult<()> {
        match stmt {
            Statement::Assign {
                kind,
                target,
                value,
            } => {
                let v = self.eval(value)?;
                match kind {
                    AssignKind::NonBlocking => queue.push((target.clone(), v)),
                    AssignKind::Continuous | AssignKind::Blocking => self.write(target, v)?,
                }
            }
            Statement::Block(stmts) | Statement::List(stmts) => {
                for s in stmts {
                    self.exec(s, queue)?;
                }
            }
            Statement::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.bits != 0 {
                    self.exec(then, queue)?;
                } else if let Some(otherwise) = otherwise {
                    self.exec(otherwise, queue)?;
                }
            }
            Statement::Case {
                selector,
                arms,
                default,
            } => {
                let sel = self.eval(selector)?.bits;
                let mut taken = None;
                'arms: for arm in arms {
                    for label in &arm.labels {
                        if self.eval(label)?.bits == sel {
                            taken = Some(&arm.body);
                            break 'arms;
                        }
                    }
                }
                match (taken, default) {
                    (Some(body), _) => self.exec(body, queue)?,
                    (None, Some(body)) => self.exec(body, queue)?,
                    (None, None) => {}
                }
            }
            Statement::Always { .. } => {
                return Err(EvalError::Unsupported("nested always block".into()));
            }
            Statement::Instance(instance) => {
                return Err(EvalError::Unsupported(format!("instance `{}`", instance.name)));
            }
            Statement::Comment(_) => {}
        }
        Ok(())
    }

    fn store(&mut self, net: &Net, bits: u64) {
        let bits = bits & mask(net.width());
        if self.values.get(net.name()) != Some(&bits) {
            self.changed = true;
            self.values.insert(net.name().to_string(), bits);
        }
    }

    fn write(&mut self, target: &Expr, value: Value) -> EvalResult<()> {
        match target {
            Expr::Net(net) => {
                let bits = value.extended(net.width(), value.signed);
                self.store(net, bits);
            }
            Expr::BitSelect { net, index } => {
                let index = self.declared_bit(net, *index);
                let old = self.values.get(net.name()).copied().unwrap_or(0);
                let bits = (old & !(1u64 << index)) | ((value.bits & 1) << index);
                self.store(net, bits);
            }
            Expr::PartSelect { net, range } => {
                let range = self.declared_range(net, *range);
                let old = self.values.get(net.name()).copied().unwrap_or(0);
                let field = mask(range.width()) << range.lsb();
                let bits = (old & !field) | ((value.bits << range.lsb()) & field);
                self.store(net, bits);
            }
            Expr::Concat(parts) => {
                let mut rest = value.bits;
                for part in parts.iter().rev() {
                    let width = part.width();
                    self.write(part, Value::new(rest, width, false)?)?;
                    rest = if width >= 64 { 0 } else { rest >> width };
                }
            }
            other => return Err(EvalError::Unsupported(format!("assignment to `{other}`"))),
        }
        Ok(())
    }
}

fn binary(op: BinaryOp, l: Value, r: Value) -> EvalResult<Value> {
    let signed = l.signed && r.signed;
    let width = l.width.max(r.width);
    let (a, b) = (l.extended(width, signed), r.extended(width, signed));
    let (sa, sb) = (sext(a, width), sext(b, width));
    let arith = |bits: u64| Value::new(bits, width, signed);
    match op {
        BinaryOp::Add => arith(a.wrapping_add(b)),
        BinaryOp::Sub => arith(a.wrapping_sub(b)),
        BinaryOp::Mul => arith(a.wrapping_mul(b)),
        BinaryOp::Div | BinaryOp::Mod if b == 0 => Err(EvalError::DivideByZero),
        BinaryOp::Div if signed => arith(sa.wrapping_div(sb) as u64),
        BinaryOp::Div => arith(a / b),
        BinaryOp::Mod if signed => arith(sa.wrapping_rem(sb) as u64),
        BinaryOp::Mod => arith(a % b),
        BinaryOp::And => arith(a & b),
        BinaryOp::Or => arith(a | b),
        BinaryOp::Xor => arith(a ^ b),
        BinaryOp::Xnor => arith(!(a ^ b)),
        BinaryOp::LogicalAnd => Ok(Value::flag(a != 0 && b != 0)),
        BinaryOp::LogicalOr => Ok(Value::flag(a != 0 || b != 0)),
        BinaryOp::Eq => Ok(Value::flag(a == b)),
        BinaryOp::Ne => Ok(Value::flag(a != b)),
        BinaryOp::Lt => Ok(Value::flag(if signed { sa < sb } else { a < b })),
        BinaryOp::Le => Ok(Value::flag(if signed { sa <= sb } else { a <= b })),
        BinaryOp::Gt => Ok(Value::flag(if signed { sa > sb } else { a > b })),
        BinaryOp::Ge => Ok(Value::flag(if signed { sa >= sb } else { a >= b })),
        BinaryOp::Shl => Value::new(l.bits.checked_shl(r.bits as u32).unwrap_or(0), l.width, l.signed),
        BinaryOp::Shr => Value::new(l.bits.checked_shr(r.bits as u32).unwrap_or(0), l.width, l.signed),
        BinaryOp::Ashr if l.signed => {
            let shift = r.bits.min(63) as u32;
            Value::new((sext(l.bits, l.width) >> shift) as u64, l.width, true)
        }
        BinaryOp::Ashr => Value::new(l.bits.checked_shr(r.bits as u32).unwrap_or(0), l.width, false),
    }
}

fn unary(op: UnaryOp, v: Value) -> Value {
    let all = mask(v.width);
    let same = |bits: u64| Value {
        bits: bits & all,
        ..v
    };
    match op {
        UnaryOp::Negate => same(v.bits.wrapping_neg()),
        UnaryOp::Complement => same(!v.bits),
        UnaryOp::LogicalNot => Value::flag(v.bits == 0),
        UnaryOp::ReduceAnd => Value::flag(v.bits == all),
        UnaryOp::ReduceOr => Value::flag(v.bits != 0),
        UnaryOp::ReduceXor => Value::flag(v.bits.count_ones() % 2 == 1),
        UnaryOp::ReduceNand => Value::flag(v.bits != all),
        UnaryOp::ReduceNor => Value::flag(v.bits == 0),
        UnaryOp::ReduceXnor => Value::flag(v.bits.count_ones() % 2 == 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_verilog::Literal;

    fn assign(target: Net, value: Expr) -> Statement {
        Statement::continuous(target, value).unwrap()
    }

    #[test]
    fn settles_out_of_order_assignments() {
        let mut m = Module::new("t");
        let a = Net::input("a", 4);
        let t = Net::wire("t", 4);
        let y = Net::wire("y", 4);
        m.add_port(a.clone()).unwrap();
        m.state(assign(y.clone(), Expr::unary(UnaryOp::Complement, Expr::Net(t.clone()))))
            .unwrap();
        m.state(assign(t, Expr::Net(a))).unwrap();
        let mut ev = Evaluator::new(&m);
        ev.set("a", 0b0101);
        ev.settle().unwrap();
        assert_eq!(ev.get("y"), Some(0b1010));
    }

    #[test]
    fn selects_follow_the_declared_direction() {
        let options = forge_verilog::ModuleOptions {
            reverse_port_ranges: true,
            ..Default::default()
        };
        let mut m = Module::with_options("t", options);
        let a = Net::input("a", 4);
        m.add_port(a.clone()).unwrap();
        let value = Expr::concat(vec![a.range(1, 0).unwrap(), a.bit(3).unwrap()]);
        m.state(assign(Net::wire("y", 3), value)).unwrap();
        assert_eq!(m.statements()[0].to_string(), "assign y = {a[2:3], a[0]};\n");

        let mut ev = Evaluator::new(&m);
        ev.set("a", 0b1001);
        ev.settle().unwrap();
        assert_eq!(ev.get("y"), Some(0b011));
        ev.set("a", 0b0110);
        ev.settle().unwrap();
        assert_eq!(ev.get("y"), Some(0b100));
    }

    #[test]
    fn undriven_input_is_reported() {
        let mut m = Module::new("t");
        m.state(assign(Net::wire("y", 1), Expr::Net(Net::wire("a", 1)))).unwrap();
        let mut ev = Evaluator::new(&m);
        assert_eq!(ev.settle(), Err(EvalError::Unassigned("a".into())));
    }

    #[test]
    fn signed_comparison_needs_both_sides_signed() {
        let m = Module::new("t");
        let ev = Evaluator::new(&m);
        let minus_one = Expr::Literal(Literal::hex(0xFF, 8));
        let one = Expr::Literal(Literal::hex(1, 8));
        let lt = Expr::binary(BinaryOp::Lt, minus_one, one).unwrap();
        assert_eq!(ev.eval(&lt).unwrap().bits, 0);
        let l = Value::new(0xFF, 8, true).unwrap();
        let r = Value::new(1, 8, true).unwrap();
        assert_eq!(binary(BinaryOp::Lt, l, r).unwrap().bits, 1);
        assert_eq!(binary(BinaryOp::Ashr, l, Value::flag(true)).unwrap().bits, 0xFF);
    }

    #[test]
    fn concat_and_replicate() {
        let m = Module::new("t");
        let ev = Evaluator::new(&m);
        let e = Expr::concat(vec![
            Expr::replicate(2, Expr::Literal(Literal::binary(1, 1))),
            Expr::Literal(Literal::hex(0x3, 4)),
        ]);
        let v = ev.eval(&e).unwrap();
        assert_eq!((v.bits, v.width), (0b110011, 6));
    }

    #[test]
    fn unary_reductions() {
        let v = Value::new(0b1011, 4, false).unwrap();
        assert_eq!(unary(UnaryOp::ReduceXor, v).bits, 1);
        assert_eq!(unary(UnaryOp::ReduceAnd, v).bits, 0);
        assert_eq!(unary(UnaryOp::Negate, v).bits, 0b0101);
    }
}
