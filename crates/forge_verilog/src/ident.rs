//! Turning arbitrary upstream names into legal Verilog identifiers.

/// Rewrites `name` into a simple Verilog identifier.
///
/// Letters and digits are kept; runs of underscores collapse to one; any
/// other character becomes `_`. A name starting with a digit gets a `const`
/// prefix, leading underscores are dropped, and a name that is nothing but
/// underscores becomes `underscore`.
pub fn to_verilog_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 5);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        out.push_str("const");
    }
    let mut prev_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_underscore = false;
        } else if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push('_');
            prev_underscore = false;
        }
    }
    let trimmed = out.trim_start_matches('_');
    if trimmed.is_empty() {
        if out.is_empty() {
            String::new()
        } else {
            "underscore".to_string()
        }
    } else {
        trimmed.to_string()
    }
}
