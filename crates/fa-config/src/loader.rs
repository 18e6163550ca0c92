//! Turning a configuration file into a ready field registry.

use crate::model::{AnonConfig, ConfigFormat};
use crate::resolve::{resolve_config, search_description, ConfigPath};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_config, ConfigError, ConfigResult};
use fa_anon::{FieldRegistry, RecordOutcome, TemplateField};
use fa_common::{IeDictionary, StandardDictionary};
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Configuration together with the registry built from it.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AnonConfig,
    pub registry: FieldRegistry,
    pub snapshot: ConfigSnapshot,
}

impl LoadedConfig {
    /// Anonymize a record as `copy_mode` directs.
    ///
    /// In copy mode the record is left untouched and the anonymized bytes
    /// come back owned; otherwise the record is rewritten in place and
    /// borrowed back.
    pub fn anonymize_record<'a>(
        &self,
        record: &'a mut [u8],
        fields: &[TemplateField],
    ) -> (Cow<'a, [u8]>, RecordOutcome) {
        if self.config.copy_mode {
            let (copy, outcome) = self.registry.anonymize_copy(record, fields);
            (Cow::Owned(copy), outcome)
        } else {
            let outcome = self.registry.apply_record(record, fields);
            (Cow::Borrowed(&*record), outcome)
        }
    }
}

/// Build a registry from a validated configuration.
pub fn build_registry(config: &AnonConfig) -> ConfigResult<FieldRegistry> {
    build_registry_with(config, Box::new(StandardDictionary::new()))
}

/// Build a registry using a custom element dictionary.
pub fn build_registry_with(
    config: &AnonConfig,
    dictionary: Box<dyn IeDictionary>,
) -> ConfigResult<FieldRegistry> {
    validate_config(config, dictionary.as_ref())?;

    let mut registry = FieldRegistry::with_dictionary(dictionary);
    for (idx, field) in config.field.iter().enumerate() {
        let Some(id) = registry.dictionary().resolve(&field.ie) else {
            return Err(ConfigError::InvalidValue {
                field: format!("field[{}].ie", idx),
                message: format!("unknown information element '{}'", field.ie),
            });
        };
        registry
            .add_binding(
                id,
                field.declared_length(),
                &field.method,
                &field.param,
                &field.mapping,
            )
            .map_err(|source| ConfigError::Anon {
                field: format!("field[{}] ({})", idx, field.ie),
                source,
            })?;
    }
    Ok(registry)
}

/// Parse, validate and build from configuration text.
pub fn load_from_str(
    content: &str,
    format: ConfigFormat,
    path: ConfigPath,
) -> ConfigResult<LoadedConfig> {
    let config = AnonConfig::parse(content, format)?;
    let registry = build_registry(&config)?;
    let snapshot = ConfigSnapshot::new(
        content,
        &path,
        &config.schema_version,
        config.copy_mode,
        &registry,
    );

    Ok(LoadedConfig {
        config,
        registry,
        snapshot,
    })
}

/// Resolve, read and build the configuration.
pub fn load_config(cli_path: Option<&Path>) -> ConfigResult<LoadedConfig> {
    let resolved = resolve_config(cli_path);
    let Some(path) = resolved.path.clone() else {
        return Err(ConfigError::NotFound(search_description()));
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let loaded = load_from_str(&content, ConfigFormat::from_path(&path), resolved)?;

    info!(
        path = %path.display(),
        source = %loaded.snapshot.config_source,
        hash = %loaded.snapshot.short_hash(),
        fields = loaded.registry.len(),
        "loaded anonymization config"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fa_common::InformationElementId;

    const KEY: &str = "0x1522178d33a4cf80130a5b1649907d10d8988f837979652762574c2d2a842202";

    fn toml_with(fields: &str) -> String {
        format!("schema_version = \"1.0.0\"\n{}", fields)
    }

    #[test]
    fn test_build_registry_resolves_names_and_ids() {
        let content = toml_with(&format!(
            r#"
[[field]]
ie = "sourceIPv4Address"
method = "CryptoPan"
param = "{KEY}"

[[field]]
ie = "12"
method = "ConstOverwrite"
param = "0x00"
"#
        ));
        let loaded =
            load_from_str(&content, ConfigFormat::Toml, ConfigPath::default()).unwrap();
        assert_eq!(loaded.registry.len(), 2);

        let mut addr = [128u8, 11, 68, 132];
        assert!(loaded
            .registry
            .apply_field(InformationElementId::iana(8), &mut addr));
        assert_eq!(addr, [135, 242, 180, 132]);
    }

    fn record_config(copy_mode: bool) -> LoadedConfig {
        let content = toml_with(&format!(
            r#"copy_mode = {copy_mode}

[[field]]
ie = "sourceIPv4Address"
method = "CryptoPan"
param = "{KEY}"
"#
        ));
        load_from_str(&content, ConfigFormat::Toml, ConfigPath::default()).unwrap()
    }

    fn record_fields() -> [TemplateField; 2] {
        [
            TemplateField::new(InformationElementId::iana(8), 0, 4),
            TemplateField::new(InformationElementId::iana(12), 4, 4),
        ]
    }

    #[test]
    fn test_anonymize_record_in_place() {
        let loaded = record_config(false);
        let mut record = [128u8, 11, 68, 132, 10, 0, 0, 1];

        {
            let (anonymized, outcome) = loaded.anonymize_record(&mut record, &record_fields());
            assert!(matches!(anonymized, Cow::Borrowed(_)));
            assert_eq!(&anonymized[..], &[135, 242, 180, 132, 10, 0, 0, 1]);
            assert_eq!(outcome.fields_processed, 1);
            assert_eq!(outcome.fields_anonymized, 1);
        }
        assert_eq!(record, [135, 242, 180, 132, 10, 0, 0, 1]);
    }

    #[test]
    fn test_anonymize_record_copy_mode() {
        let loaded = record_config(true);
        assert!(loaded.snapshot.copy_mode);
        let mut record = [128u8, 11, 68, 132, 10, 0, 0, 1];

        {
            let (anonymized, outcome) = loaded.anonymize_record(&mut record, &record_fields());
            assert!(matches!(anonymized, Cow::Owned(_)));
            assert_eq!(&anonymized[..], &[135, 242, 180, 132, 10, 0, 0, 1]);
            assert!(outcome.anonymized());
        }
        assert_eq!(record, [128, 11, 68, 132, 10, 0, 0, 1]);
    }

    #[test]
    fn test_integer_cidr_range_checked_at_build() {
        let content = toml_with(&format!(
            r#"
[[field]]
ie = "12"
method = "CryptoPanPrefix"
param = "{KEY}"

[[field.mapping]]
from = "10.0.0.0"
to = "192.168.0.0"
cidr = 40
"#
        ));
        let err = load_from_str(&content, ConfigFormat::Toml, ConfigPath::default()).unwrap_err();
        assert_eq!(err.code(), 44);
    }

    #[test]
    fn test_anon_error_names_field() {
        let content = toml_with(
            r#"
[[field]]
ie = "8"
method = "CryptoPan"
param = "tooshort"
"#,
        );
        let err = load_from_str(&content, ConfigFormat::Toml, ConfigPath::default()).unwrap_err();
        assert_eq!(err.code(), 42);
        assert!(err.to_string().contains("field[0] (8)"));
    }

    #[test]
    fn test_cryptopan_on_wide_field_rejected() {
        let content = toml_with(&format!(
            r#"
[[field]]
ie = "octetDeltaCount"
method = "CryptoPan"
param = "{KEY}"
"#
        ));
        let err = load_from_str(&content, ConfigFormat::Toml, ConfigPath::default()).unwrap_err();
        assert_eq!(err.code(), 46);
    }

    #[test]
    fn test_load_config_missing_cli_path() {
        let err = load_config(Some(Path::new("/nonexistent/flowanon.toml"))).unwrap_err();
        assert_eq!(err.code(), 60);
    }
}
