//! Configuration errors and semantic validation.

use crate::model::AnonConfig;
use fa_anon::{AnonError, AnonMethod};
use fa_common::IeDictionary;
use thiserror::Error;

/// Configuration result type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No configuration file found (searched {0})")]
    NotFound(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("{field}: {source}")]
    Anon {
        field: String,
        #[source]
        source: AnonError,
    },
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Io(_) => 60,
            ConfigError::Parse(_) => 61,
            ConfigError::NotFound(_) => 62,
            ConfigError::MissingField(_) => 64,
            ConfigError::InvalidValue { .. } => 65,
            ConfigError::VersionMismatch { .. } => 66,
            ConfigError::Anon { source, .. } => source.code(),
        }
    }
}

/// Check a parsed configuration before any chain is built.
pub fn validate_config(config: &AnonConfig, dictionary: &dyn IeDictionary) -> ConfigResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ConfigError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    for (idx, field) in config.field.iter().enumerate() {
        let path = format!("field[{}]", idx);

        if field.ie.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.ie", path)));
        }
        if dictionary.resolve(&field.ie).is_none() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.ie", path),
                message: format!("unknown information element '{}'", field.ie),
            });
        }

        if field.method.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.method", path)));
        }
        let methods = AnonMethod::parse_chain(&field.method).map_err(|source| ConfigError::Anon {
            field: format!("{}.method", path),
            source,
        })?;

        if !field.mapping.is_empty() && !methods.contains(&AnonMethod::CryptoPanPrefix) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.mapping", path),
                message: "subnet mappings are only allowed with CryptoPanPrefix".to_string(),
            });
        }
    }

    Ok(())
}
