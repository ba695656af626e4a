//! Relational compares under both compare policies.

use forge_conformance::{lower_module_with_config, make_config, Evaluator};
use forge_diagnostics::Severity;
use forge_lower::{CompareOp, OpNode, Operand};

fn compare(op: CompareOp, left: Operand, right: Operand) -> OpNode {
    OpNode::Compare {
        op,
        left,
        right,
        result: Operand::unsigned("r", 1),
    }
}

fn exhaustive(toml: &str, node: OpNode, expected: impl Fn(u64, u64) -> bool) {
    let config = make_config(toml).unwrap();
    let result = lower_module_with_config("cmp", &[], &[node], &config);
    assert!(!result.has_errors);
    let mut ev = Evaluator::new(&result.module);
    for a in 0..16 {
        for b in 0..16 {
            ev.set("a", a);
            ev.set("b", b);
            ev.settle().unwrap();
            assert_eq!(ev.get("r"), Some(expected(a, b) as u64), "a={a} b={b}");
        }
    }
}

fn as_signed(v: u64) -> i64 {
    ((v as i64) << 60) >> 60
}

const SIGNED_POLICY: &str = "[codegen]\nrelational_compare = \"signed\"\n";
const NATIVE_POLICY: &str = "[codegen]\nrelational_compare = \"native\"\n";

#[test]
fn signed_policy_keeps_unsigned_meaning() {
    let _ = env_logger::builder().is_test(true).try_init();
    for toml in [SIGNED_POLICY, NATIVE_POLICY] {
        exhaustive(
            toml,
            compare(CompareOp::Le, Operand::unsigned("a", 4), Operand::unsigned("b", 4)),
            |a, b| a <= b,
        );
        exhaustive(
            toml,
            compare(CompareOp::Ge, Operand::unsigned("a", 4), Operand::unsigned("b", 4)),
            |a, b| a >= b,
        );
    }
}

#[test]
fn signed_operands_compare_as_signed() {
    for toml in [SIGNED_POLICY, NATIVE_POLICY] {
        exhaustive(
            toml,
            compare(CompareOp::Lt, Operand::signed("a", 4), Operand::signed("b", 4)),
            |a, b| as_signed(a) < as_signed(b),
        );
        exhaustive(
            toml,
            compare(CompareOp::Ge, Operand::signed("a", 4), Operand::signed("b", 4)),
            |a, b| as_signed(a) >= as_signed(b),
        );
    }
}

#[test]
fn equality_ignores_policy() {
    exhaustive(
        SIGNED_POLICY,
        compare(CompareOp::Ne, Operand::unsigned("a", 4), Operand::unsigned("b", 4)),
        |a, b| a != b,
    );
}

#[test]
fn signed_policy_on_unsigned_data_is_noted() {
    let node = compare(CompareOp::Le, Operand::unsigned("a", 4), Operand::unsigned("b", 4));
    let signed = make_config(SIGNED_POLICY).unwrap();
    let result = lower_module_with_config("cmp", &[], &[node.clone()], &signed);
    let notes: Vec<_> = result.with_severity(Severity::Note).collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].code.to_string(), "P001");
    assert!(result.module.to_string().contains("wire signed [4:0] r_a_signed, r_b_signed;\n"));

    let native = make_config(NATIVE_POLICY).unwrap();
    let result = lower_module_with_config("cmp", &[], &[node], &native);
    assert!(result.diagnostics.is_empty());
    assert!(result.module.to_string().contains("wire [3:0] r_a_unsigned, r_b_unsigned;\n"));
}

#[test]
fn strict_relations_are_never_forced_signed() {
    let node = compare(CompareOp::Lt, Operand::unsigned("a", 4), Operand::unsigned("b", 4));
    let config = make_config(SIGNED_POLICY).unwrap();
    let result = lower_module_with_config("cmp", &[], &[node], &config);
    assert!(result.diagnostics.is_empty());
    assert!(result.module.to_string().contains("assign r = r_a_unsigned < r_b_unsigned;\n"));
}
