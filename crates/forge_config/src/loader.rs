//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ForgeConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "forge.toml";

const MAX_SHIFT_STAGES: u32 = 64;

/// Loads and validates `<dir>/forge.toml`.
pub fn load_config(dir: &Path) -> Result<ForgeConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<ForgeConfig, ConfigError> {
    let config: ForgeConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ForgeConfig) -> Result<(), ConfigError> {
    let stages = config.codegen.default_max_shift_stages;
    if stages == 0 || stages > MAX_SHIFT_STAGES {
        return Err(ConfigError::ValidationError {
            field: "codegen.default_max_shift_stages".to_string(),
            reason: format!("must be between 1 and {MAX_SHIFT_STAGES}, got {stages}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationalCompare;

    #[test]
    fn empty_file_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, ForgeConfig::default());
    }

    #[test]
    fn full_codegen_table() {
        let config = load_config_from_str(
            r#"
[codegen]
relational_compare = "native"
invert_port_range = true
lowercase_module_names = true
default_max_shift_stages = 6
"#,
        )
        .unwrap();
        let c = config.codegen;
        assert_eq!(c.relational_compare, RelationalCompare::Native);
        assert!(c.invert_port_range);
        assert!(c.lowercase_module_names);
        assert_eq!(c.default_max_shift_stages, 6);
    }

    #[test]
    fn stage_bound_is_validated() {
        let err = load_config_from_str("[codegen]\ndefault_max_shift_stages = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
        let err = load_config_from_str("[codegen]\ndefault_max_shift_stages = 65\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = load_config_from_str("[codegen]\nshift_stages = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        let err = load_config_from_str("not toml {{").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn loads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[codegen]\nlowercase_module_names = true\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.codegen.lowercase_module_names);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
