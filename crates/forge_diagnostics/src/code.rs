//! Stable diagnostic codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of condition a code describes; determines the display prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Malformed input that aborts lowering, prefixed with `E`.
    Error,
    /// Suspicious but accepted input, prefixed with `W`.
    Warning,
    /// A compatibility policy changed the generated text, prefixed with `P`.
    Policy,
}

impl Category {
    /// The single-letter prefix.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Policy => 'P',
        }
    }
}

/// A category plus a number, displayed as e.g. `E301` or `P001`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category.
    pub category: Category,
    /// Number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
