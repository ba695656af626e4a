//! Configuration types deserialized from `forge.toml`.

use serde::Deserialize;

/// The whole `forge.toml` file.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ForgeConfig {
    /// The `[codegen]` table.
    #[serde(default)]
    pub codegen: CodegenConfig,
}

/// Settings that change the Verilog text the lowering layer produces.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CodegenConfig {
    /// How `<=` and `>=` comparisons are emitted.
    pub relational_compare: RelationalCompare,
    /// Declare port ranges as `[lsb:msb]` instead of `[msb:lsb]`.
    pub invert_port_range: bool,
    /// Lowercase module identifiers when building a module.
    pub lowercase_module_names: bool,
    /// Stage bound for variable shifts whose node does not carry one.
    pub default_max_shift_stages: u32,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            relational_compare: RelationalCompare::default(),
            invert_port_range: false,
            lowercase_module_names: false,
            default_max_shift_stages: 32,
        }
    }
}

/// Lowering policy for the `<=` and `>=` operators.
///
/// Some simulators mis-evaluate unsigned relational operators, so by default
/// both comparison shims are declared `signed` and widened by one zero bit
/// when the operand is unsigned, which keeps the numeric result unchanged.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelationalCompare {
    /// Always compare through signed shims.
    #[default]
    Signed,
    /// Use each operand's own signedness.
    Native,
}
