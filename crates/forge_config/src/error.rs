//! Errors raised while loading `forge.toml`.

/// Failure to read, parse or validate a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML text is malformed or has fields of the wrong type.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value parsed but is out of its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    ValidationError {
        /// Dotted path of the offending key.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}
