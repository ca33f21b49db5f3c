//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the agreements database and logs live and which
//!   display locale the list view uses.
//! - Load that description from TOML.
//!
//! # Invariants
//! - Configured paths are absolute.
//! - Unknown keys are rejected rather than silently ignored.

use crate::logging::default_log_level;
use crate::view::row::DisplayLocale;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime configuration for one core instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file; an in-memory database is used when absent.
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; file logging stays off when absent.
    pub log_dir: Option<PathBuf>,
    pub locale: DisplayLocale,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            locale: DisplayLocale::default(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("database_path", &self.database_path),
            ("log_dir", &self.log_dir),
        ] {
            if let Some(path) = value {
                if !path.is_absolute() {
                    return Err(ConfigError::Invalid(format!(
                        "`{key}` must be an absolute path, got `{}`",
                        path.display()
                    )));
                }
            }
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("`log_level` must not be blank".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::view::row::DisplayLocale;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.locale, DisplayLocale::Ru);
    }

    #[test]
    fn parses_all_keys() {
        let config = CoreConfig::from_toml_str(
            r#"
            database_path = "/var/lib/pactwatch/agreements.sqlite3"
            log_level = "warn"
            log_dir = "/var/log/pactwatch"
            locale = "en"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.locale, DisplayLocale::En);
        assert!(config.database_path.is_some());
    }

    #[test]
    fn rejects_relative_paths_and_unknown_keys() {
        let err = CoreConfig::from_toml_str(r#"log_dir = "logs""#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("log_dir")));

        let err = CoreConfig::from_toml_str(r#"colour = "red""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
