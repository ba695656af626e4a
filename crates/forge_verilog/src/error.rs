//! Structural errors raised while building Verilog constructs.
//!
//! All of these mean the caller handed in a malformed operation graph. They
//! are raised at construction time and nothing partially built survives.

/// Result alias for fallible construction.
pub type VerilogResult<T> = Result<T, VerilogError>;

/// A construction-time failure, naming the construct involved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerilogError {
    /// The assigned value is wider than its target.
    #[error("unbalanced assignment to `{target}`: {target_width}-bit target cannot hold {value_width}-bit value")]
    UnbalancedAssignment {
        /// Rendered assignment target.
        target: String,
        /// Target width in bits.
        target_width: u32,
        /// Value width in bits.
        value_width: u32,
    },

    /// The operands of a width-preserving operator differ in width.
    #[error("unbalanced operation `{op}`: left operand is {left_width} bits, right operand is {right_width} bits")]
    UnbalancedOperation {
        /// Operator text.
        op: String,
        /// Left operand width.
        left_width: u32,
        /// Right operand width.
        right_width: u32,
    },

    /// `lsb > msb`, or a select outside the declared width.
    #[error("illegal bit range [{msb}:{lsb}] on {target}")]
    IllegalBitRange {
        /// What the range was applied to.
        target: String,
        /// Requested most significant bit.
        msb: u32,
        /// Requested least significant bit.
        lsb: u32,
    },

    /// The identifier is already declared with a kind that cannot be upgraded.
    #[error("duplicate declaration of `{name}`: already declared as {existing}, cannot redeclare as {requested}")]
    DuplicateDeclaration {
        /// Identifier.
        name: String,
        /// Kind already in the registry.
        existing: String,
        /// Kind requested.
        requested: String,
    },

    /// Qualified nets belong to another scope and cannot be declared here.
    #[error("`{name}` is a {kind} net and cannot be declared in this module")]
    NotDeclarable {
        /// Identifier.
        name: String,
        /// Its kind.
        kind: String,
    },

    /// A port must be an input, output or inout net.
    #[error("`{name}` is a {kind} net, not a port")]
    NotAPort {
        /// Identifier.
        name: String,
        /// Its kind.
        kind: String,
    },

    /// Port declaration failed; wraps the underlying error with the module name.
    #[error("module `{module}` failed to add port because: {source}")]
    PortDeclaration {
        /// Module identifier.
        module: String,
        /// The underlying failure.
        #[source]
        source: Box<VerilogError>,
    },

    /// `undeclare` was called for an unknown identifier.
    #[error("`{name}` is not declared")]
    NotDeclared {
        /// Identifier.
        name: String,
    },

    /// The two arms of a conditional expression differ in width.
    #[error("conditional arms differ in width: {then_width} bits vs {else_width} bits")]
    ConditionalWidthMismatch {
        /// Width of the true arm.
        then_width: u32,
        /// Width of the false arm.
        else_width: u32,
    },

    /// A lexicality with no elements was linearized.
    #[error("cannot linearize an empty lexicality")]
    EmptyLexicality,

    /// A literal digit string could not be parsed.
    #[error("invalid literal `{text}`")]
    InvalidLiteral {
        /// The offending text.
        text: String,
    },

    /// The expression cannot appear on the left of an assignment.
    #[error("`{expr}` is not assignable")]
    NotAssignable {
        /// Rendered expression.
        expr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_carry_module_name() {
        let err = VerilogError::PortDeclaration {
            module: "adder".to_string(),
            source: Box::new(VerilogError::DuplicateDeclaration {
                name: "a".to_string(),
                existing: "input".to_string(),
                requested: "input".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("module `adder` failed to add port because: duplicate declaration of `a`"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn bit_range_message() {
        let err = VerilogError::IllegalBitRange {
            target: "net `a` (8 bits)".to_string(),
            msb: 9,
            lsb: 2,
        };
        assert_eq!(err.to_string(), "illegal bit range [9:2] on net `a` (8 bits)");
    }
}
