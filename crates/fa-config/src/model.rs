//! Configuration file model.

use crate::validate::{ConfigError, ConfigResult};
use fa_anon::SubnetMapSpec;
use fa_common::FieldLength;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk encoding of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON; everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Anonymization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonConfig {
    pub schema_version: String,

    /// Anonymize a copy of each record instead of the record itself.
    #[serde(default)]
    pub copy_mode: bool,

    /// Field bindings in configuration order.
    #[serde(default)]
    pub field: Vec<FieldConfig>,
}

/// One anonymization binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Element name, `id`, or `id:enterprise`.
    pub ie: String,

    /// Field length in bytes; 0 means variable. Omitted means the
    /// dictionary length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u16>,

    /// Method name or `+`-joined chain.
    pub method: String,

    #[serde(default)]
    pub param: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapping: Vec<SubnetMapSpec>,
}

impl FieldConfig {
    pub fn new(ie: impl Into<String>, method: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            ie: ie.into(),
            length: None,
            method: method.into(),
            param: param.into(),
            mapping: Vec::new(),
        }
    }

    /// Declared length, if the field sets one.
    pub fn declared_length(&self) -> Option<FieldLength> {
        self.length.map(FieldLength::from_raw)
    }
}

impl AnonConfig {
    /// Load a configuration file, choosing the format from its extension.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Parse configuration text.
    pub fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        match format {
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("Invalid TOML: {}", e))),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("Invalid JSON: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
schema_version = "1.0.0"
copy_mode = true

[[field]]
ie = "sourceIPv4Address"
method = "PreserveBroadcast+CryptoPanPrefix"
param = "0x1522178d33a4cf80130a5b1649907d10d8988f837979652762574c2d2a842202"

[[field.mapping]]
from = "10.0.0.0"
to = "192.168.0.0"
cidr = "16"

[[field]]
ie = "1:29305"
length = 0
method = "Randomize"
"#;

    #[test]
    fn test_parse_toml() {
        let cfg = AnonConfig::parse(SAMPLE, ConfigFormat::Toml).unwrap();
        assert!(cfg.copy_mode);
        assert_eq!(cfg.field.len(), 2);
        assert_eq!(cfg.field[0].mapping.len(), 1);
        assert_eq!(cfg.field[0].mapping[0].cidr, "16");
        assert_eq!(cfg.field[0].declared_length(), None);
        assert_eq!(cfg.field[1].declared_length(), Some(FieldLength::Variable));
        assert_eq!(cfg.field[1].param, "");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "schema_version": "1.0.0",
            "field": [{"ie": "8", "length": 4, "method": "HashSha1"}]
        }"#;
        let cfg = AnonConfig::parse(json, ConfigFormat::Json).unwrap();
        assert!(!cfg.copy_mode);
        assert_eq!(cfg.field[0].declared_length(), Some(FieldLength::Fixed(4)));
    }

    #[test]
    fn test_cidr_accepts_integer() {
        let toml = r#"
schema_version = "1.0.0"

[[field]]
ie = "12"
method = "CryptoPanPrefix"

[[field.mapping]]
from = "10.0.0.0"
to = "192.168.0.0"
cidr = 16
"#;
        let cfg = AnonConfig::parse(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(cfg.field[0].mapping[0].cidr, "16");

        let json = r#"{
            "schema_version": "1.0.0",
            "field": [{"ie": "12", "method": "CryptoPanPrefix",
                       "mapping": [{"from": "10.0.0.0", "to": "20.0.0.0", "cidr": 40}]}]
        }"#;
        let cfg = AnonConfig::parse(json, ConfigFormat::Json).unwrap();
        assert_eq!(cfg.field[0].mapping[0].cidr, "40");

        let err = AnonConfig::parse(
            &toml.replace("cidr = 16", "cidr = 1.5"),
            ConfigFormat::Toml,
        )
        .unwrap_err();
        assert_eq!(err.code(), 61);
    }

    #[test]
    fn test_parse_error() {
        let err = AnonConfig::parse("schema_version = ", ConfigFormat::Toml).unwrap_err();
        assert_eq!(err.code(), 61);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("anon")), ConfigFormat::Toml);
    }
}
