//! Parsing and validation of `forge.toml` code-generation settings.
//!
//! Every field has a default, so an empty file (or a missing `[codegen]`
//! table) yields [`CodegenConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
