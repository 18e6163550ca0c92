//! Configuration snapshots for audit and reproducibility.
//!
//! A snapshot records which file was loaded, its hash, and the bindings it
//! produced, so anonymized output can be traced back to the exact
//! configuration. Keys are never included.

use chrono::{DateTime, Utc};
use fa_anon::FieldRegistry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::ConfigPath;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the configuration file content.
    pub config_hash: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration path.
    pub config_source: String,

    /// Whether records are anonymized as copies.
    pub copy_mode: bool,

    /// One entry per bound field, in configuration order.
    pub fields: Vec<FieldSummary>,
}

/// Summary of one field binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    /// Numeric element id (`8` or `1:29305`).
    pub ie: String,
    pub name: String,
    pub length: String,
    /// Chains in application order, as `+`-joined method names.
    pub chains: Vec<String>,
}

impl ConfigSnapshot {
    /// Create a snapshot from loaded configuration.
    pub fn new(
        content: &str,
        path: &ConfigPath,
        schema_version: &str,
        copy_mode: bool,
        registry: &FieldRegistry,
    ) -> Self {
        let fields = registry
            .iter()
            .map(|binding| FieldSummary {
                ie: binding.id.to_string(),
                name: binding.name.clone(),
                length: binding.length.to_string(),
                chains: binding.chains.iter().map(|c| c.to_string()).collect(),
            })
            .collect();

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: schema_version.to_string(),
            config_hash: hash_content(content),
            config_path: path.path.as_ref().map(|p| p.display().to_string()),
            config_source: path.source.to_string(),
            copy_mode,
            fields,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Short form of the hash for human output.
    pub fn short_hash(&self) -> &str {
        &self.config_hash[..self.config_hash.len().min(12)]
    }
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
