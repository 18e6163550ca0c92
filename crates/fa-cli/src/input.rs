//! Parsing and applying command-line field input.

use fa_anon::{FieldRegistry, TemplateField};
use fa_common::{FieldLength, InformationElementId};
use fa_config::LoadedConfig;
use serde::Serialize;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Rejected command input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown information element '{0}'")]
    UnknownElement(String),

    #[error("no anonymization configured for {0}")]
    NotConfigured(String),

    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    #[error("invalid hex field '{value}': {message}")]
    InvalidHex { value: String, message: String },

    #[error("invalid field layout '{value}': {message}")]
    InvalidLayout { value: String, message: String },
}

/// Resolve an element reference to a bound field.
pub fn bound_element(
    registry: &FieldRegistry,
    reference: &str,
) -> Result<InformationElementId, InputError> {
    let id = registry
        .dictionary()
        .resolve(reference)
        .ok_or_else(|| InputError::UnknownElement(reference.to_string()))?;
    if registry.binding(id).is_none() {
        return Err(InputError::NotConfigured(
            registry.dictionary().display_name(id),
        ));
    }
    Ok(id)
}

/// Decode a field given as hex, with or without a `0x` prefix.
pub fn parse_hex_field(value: &str) -> Result<Vec<u8>, InputError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(digits).map_err(|e| InputError::InvalidHex {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// One anonymized value for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldResult {
    pub original: String,
    pub anonymized: String,
    /// Whether any byte changed.
    pub changed: bool,
}

/// Anonymize dotted-decimal addresses through a field's chains.
pub fn anonymize_addresses(
    registry: &FieldRegistry,
    id: InformationElementId,
    addrs: &[String],
) -> Result<Vec<FieldResult>, InputError> {
    addrs
        .iter()
        .map(|raw| {
            let addr = raw
                .trim()
                .parse::<Ipv4Addr>()
                .map_err(|_| InputError::InvalidAddress(raw.clone()))?;
            let mut buf = addr.octets();
            let changed = registry.apply_field(id, &mut buf);
            Ok(FieldResult {
                original: addr.to_string(),
                anonymized: Ipv4Addr::from(buf).to_string(),
                changed,
            })
        })
        .collect()
}

/// Anonymize a hex-encoded field through a field's chains.
pub fn anonymize_hex(
    registry: &FieldRegistry,
    id: InformationElementId,
    value: &str,
) -> Result<FieldResult, InputError> {
    let mut buf = parse_hex_field(value)?;
    let original = hex::encode(&buf);
    let changed = registry.apply_field(id, &mut buf);
    Ok(FieldResult {
        original,
        anonymized: hex::encode(&buf),
        changed,
    })
}

/// Parse a record field layout, `IE@OFFSET` or `IE@OFFSET/LEN`.
///
/// Without `/LEN` the length is the bound field's declared length, then the
/// dictionary's canonical length.
pub fn parse_template_field(
    registry: &FieldRegistry,
    layout: &str,
) -> Result<TemplateField, InputError> {
    let invalid = |message: &str| InputError::InvalidLayout {
        value: layout.to_string(),
        message: message.to_string(),
    };

    let (reference, position) = layout
        .rsplit_once('@')
        .ok_or_else(|| invalid("expected IE@OFFSET or IE@OFFSET/LEN"))?;
    let id = registry
        .dictionary()
        .resolve(reference)
        .ok_or_else(|| InputError::UnknownElement(reference.to_string()))?;

    let (offset, length) = match position.split_once('/') {
        Some((offset, length)) => (offset, Some(length)),
        None => (position, None),
    };
    let offset = offset
        .parse::<usize>()
        .map_err(|_| invalid("offset is not a number"))?;
    let length = match length {
        Some(length) => length
            .parse::<usize>()
            .map_err(|_| invalid("length is not a number"))?,
        None => fixed_length(registry, id)
            .ok_or_else(|| invalid("element has no fixed length; give one with /LEN"))?,
    };

    Ok(TemplateField::new(id, offset, length))
}

fn fixed_length(registry: &FieldRegistry, id: InformationElementId) -> Option<usize> {
    let length = match registry.binding(id) {
        Some(binding) => binding.length,
        None => registry.dictionary().lookup(id)?.length,
    };
    match length {
        FieldLength::Fixed(n) => Some(usize::from(n)),
        FieldLength::Variable => None,
    }
}

/// One anonymized record for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordResult {
    pub original: String,
    pub anonymized: String,
    pub copy_mode: bool,
    pub fields_processed: usize,
    pub fields_anonymized: usize,
    pub fields_skipped: usize,
}

/// Anonymize a hex-encoded record laid out by `layouts`.
pub fn anonymize_record(
    loaded: &LoadedConfig,
    value: &str,
    layouts: &[String],
) -> Result<RecordResult, InputError> {
    let fields = layouts
        .iter()
        .map(|layout| parse_template_field(&loaded.registry, layout))
        .collect::<Result<Vec<_>, _>>()?;
    let mut record = parse_hex_field(value)?;
    let original = hex::encode(&record);

    let (anonymized, outcome) = loaded.anonymize_record(&mut record, &fields);
    Ok(RecordResult {
        original,
        anonymized: hex::encode(anonymized.as_ref()),
        copy_mode: loaded.config.copy_mode,
        fields_processed: outcome.fields_processed,
        fields_anonymized: outcome.fields_anonymized,
        fields_skipped: outcome.fields_skipped,
    })
}
