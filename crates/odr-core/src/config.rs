//! Configuration loading for the odr CLI.
//!
//! Resolution order (highest to lowest priority):
//! 1. Explicit `--config` path
//! 2. `ODR_CONFIG` environment variable
//! 3. XDG config home (`~/.config/odr/config.toml`)
//! 4. Built-in defaults
//!
//! An explicitly named file must exist; the XDG file is optional.

use odr_table::{TableConfig, TableSorter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "ODR_CONFIG";

const CONFIG_DIR_NAME: &str = "odr";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid TOML in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Validation failed: {0}")]
    Invalid(String),
}

impl From<ConfigError> for odr_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(message) => odr_common::Error::InvalidConfig(message),
            other => odr_common::Error::Config(other.to_string()),
        }
    }
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for export and print output when a command names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Table component settings.
    #[serde(default)]
    pub table: TableConfig,
}

impl AppConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Check values serde cannot: the export prefix must be usable as a
    /// file name and the locale must have collation data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.table.export.prefix;
        if prefix.is_empty() {
            return Err(ConfigError::Invalid("export prefix is empty".into()));
        }
        if prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "export prefix '{}' contains a path separator",
                prefix
            )));
        }
        TableSorter::for_locale(&self.table.locale)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Output directory, falling back to the working directory.
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Resolved configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AppConfig,
    /// File the config came from (None if using defaults).
    pub path: Option<PathBuf>,
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config file (highest priority).
    pub config_path: Option<PathBuf>,
    /// Config home override; defaults to `XDG_CONFIG_HOME` or `~/.config`.
    pub config_home: Option<PathBuf>,
    /// Ignore `ODR_CONFIG`.
    pub ignore_env: bool,
}

/// Load configuration with the standard resolution order.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let env_path = if options.ignore_env {
        None
    } else {
        std::env::var_os(CONFIG_ENV).map(PathBuf::from)
    };

    let explicit = options.config_path.clone().or(env_path);
    let path = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound { path }),
        Some(path) => Some(path),
        None => {
            let candidate = config_home(options).join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            candidate.exists().then_some(candidate)
        }
    };

    let config = match &path {
        Some(path) => load_config_file(path)?,
        None => AppConfig::default(),
    };
    config.validate()?;

    let source = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    debug!(
        source = %source,
        locale = %config.table.locale,
        "Configuration loaded"
    );

    Ok(ResolvedConfig { config, path })
}

fn config_home(options: &ConfigOptions) -> PathBuf {
    if let Some(home) = &options.config_home {
        return home.clone();
    }
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        })
}

fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    AppConfig::from_toml(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Options that never touch the real environment.
    fn isolated(home: &Path) -> ConfigOptions {
        ConfigOptions {
            config_path: None,
            config_home: Some(home.to_path_buf()),
            ignore_env: true,
        }
    }

    #[test]
    fn test_defaults_when_nothing_exists() {
        let home = TempDir::new().unwrap();
        let resolved = load_config(&isolated(home.path())).unwrap();
        assert!(resolved.path.is_none());
        assert_eq!(resolved.config, AppConfig::default());
        assert_eq!(resolved.config.table.locale, "ja");
    }

    #[test]
    fn test_config_home_file_is_used() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join("odr");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.toml"),
            "output_dir = \"out\"\n[table.export]\nprefix = \"usage\"\n",
        )
        .unwrap();

        let resolved = load_config(&isolated(home.path())).unwrap();
        assert_eq!(resolved.config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(resolved.config.table.export.prefix, "usage");
        assert_eq!(resolved.config.table.toolbar.print, "印刷");
    }

    #[test]
    fn test_explicit_path_wins() {
        let home = TempDir::new().unwrap();
        let explicit = home.path().join("custom.toml");
        fs::write(&explicit, "[table]\nlocale = \"en\"\n").unwrap();

        let mut options = isolated(home.path());
        options.config_path = Some(explicit.clone());
        let resolved = load_config(&options).unwrap();
        assert_eq!(resolved.path, Some(explicit));
        assert_eq!(resolved.config.table.locale, "en");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let home = TempDir::new().unwrap();
        let mut options = isolated(home.path());
        options.config_path = Some(home.path().join("missing.toml"));
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let home = TempDir::new().unwrap();
        let path = home.path().join("bad.toml");
        fs::write(&path, "output_dir = [").unwrap();

        let mut options = isolated(home.path());
        options.config_path = Some(path);
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.table.export.prefix = "../escape".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.table.export.prefix = "ok".into();
        config.table.locale = "not a locale!".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_error_conversion() {
        let err: odr_common::Error = ConfigError::Invalid("x".into()).into();
        assert!(matches!(err, odr_common::Error::InvalidConfig(_)));
        let err: odr_common::Error = ConfigError::NotFound {
            path: PathBuf::from("x"),
        }
        .into();
        assert!(matches!(err, odr_common::Error::Config(_)));
    }
}
