//! flowanon configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the anonymization config (TOML or JSON)
//! - Config resolution (CLI → env → XDG → /etc)
//! - Semantic validation
//! - Construction of a [`fa_anon::FieldRegistry`] from the config
//! - Config snapshots for audit output

pub mod loader;
pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use loader::{build_registry, build_registry_with, load_config, load_from_str, LoadedConfig};
pub use model::{AnonConfig, ConfigFormat, FieldConfig};
pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use snapshot::{ConfigSnapshot, FieldSummary};
pub use validate::{validate_config, ConfigError, ConfigResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
