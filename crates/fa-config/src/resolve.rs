//! Configuration path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → system path.

use std::path::{Path, PathBuf};

/// Discovered configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigPath {
    /// Path to the configuration file (or None if not found).
    pub path: Option<PathBuf>,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/flowanon/.
    SystemConfig,

    /// Nothing found.
    #[default]
    NotFound,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::NotFound => write!(f, "not found"),
        }
    }
}

/// Environment variable naming the configuration file.
pub const ENV_CONFIG_PATH: &str = "FLOWANON_CONFIG";
/// Environment variable naming a directory holding `anon.toml`.
pub const ENV_CONFIG_DIR: &str = "FLOWANON_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "anon.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "flowanon";

/// Resolve the configuration file.
///
/// Resolution order:
/// 1. Explicit CLI path (used even if missing, so the read error names it)
/// 2. FLOWANON_CONFIG
/// 3. FLOWANON_CONFIG_DIR + anon.toml
/// 4. XDG config directory (~/.config/flowanon/anon.toml)
/// 5. System config (/etc/flowanon/anon.toml)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPath {
    if let Some(path) = cli_path {
        return ConfigPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    ConfigPath::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPath {
    ConfigPath {
        path: Some(path),
        source,
    }
}

/// Get the XDG config directory for flowanon.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// Locations searched when no path is given, for error messages.
pub fn search_description() -> String {
    let mut places = vec![
        format!("${}", ENV_CONFIG_PATH),
        format!("${}/{}", ENV_CONFIG_DIR, CONFIG_FILENAME),
    ];
    if let Some(dir) = xdg_config_dir() {
        places.push(dir.join(CONFIG_FILENAME).display().to_string());
    }
    places.push(system_config_dir().join(CONFIG_FILENAME).display().to_string());
    places.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(format!("{}", ConfigSource::NotFound), "not found");
    }

    #[test]
    fn test_cli_path_wins_even_if_missing() {
        let resolved = resolve_config(Some(Path::new("/nonexistent/anon.toml")));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path.unwrap(), PathBuf::from("/nonexistent/anon.toml"));
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/flowanon"));
    }

    #[test]
    fn test_search_description_mentions_env() {
        let desc = search_description();
        assert!(desc.contains("$FLOWANON_CONFIG"));
        assert!(desc.contains("/etc/flowanon/anon.toml"));
    }
}
