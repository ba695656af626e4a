//! Text and JSON output for diagnostics.

use crate::diagnostic::Diagnostic;

/// Formats a diagnostic as a string.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// rustc-style terminal output:
///
/// ```text
/// error[E309]: shift `y` needs 4 stages but at most 3 are allowed
///   --> shift `y`
///    = note: the shift amount must be at most 3 bits wide
/// ```
pub struct TerminalRenderer;

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}[{}]: {}\n", diag.severity, diag.code, diag.message);
        if let Some(construct) = &diag.construct {
            out.push_str(&format!("  --> {construct}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}

/// One JSON object per diagnostic, for tooling.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        serde_json::json!({
            "severity": diag.severity.to_string(),
            "code": diag.code.to_string(),
            "message": diag.message,
            "construct": diag.construct,
            "notes": diag.notes,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    fn sample() -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::new(Category::Error, 308),
            "register `q` has no template for control inputs [set, clear]",
        )
        .with_construct("register `q`")
        .with_note("synchronous set/reset cannot be combined with asynchronous preset/clear")
    }

    #[test]
    fn terminal_layout() {
        let out = TerminalRenderer.render(&sample());
        assert!(out.starts_with("error[E308]: register `q` has no template"));
        assert!(out.contains("  --> register `q`\n"));
        assert!(out.contains("   = note: synchronous set/reset"));
    }

    #[test]
    fn terminal_without_construct() {
        let d = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 2), "odd");
        assert_eq!(TerminalRenderer.render(&d), "warning[W002]: odd\n");
    }

    #[test]
    fn json_fields() {
        let out = JsonRenderer.render(&sample());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["code"], "E308");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["construct"], "register `q`");
        assert_eq!(value["notes"].as_array().unwrap().len(), 1);
    }
}
