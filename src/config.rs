//! Runtime configuration for Errand.
//!
//! Configuration is a TOML document. Missing keys fall back to the embedded
//! defaults and `DATABASE_URL` overrides the configured database URL.

use crate::task_letter::domain::{DEFAULT_FILENAME_PREFIX, DEFAULT_URL_PREFIX, ExportNaming};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides [`DatabaseConfig::url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/errand";
const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_LOG_FILTER: &str = "info,diesel=warn";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrandConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Export naming settings.
    pub export: ExportConfig,
    /// Logging settings.
    pub log: LogConfig,
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Export naming settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// URL path exported documents are served from.
    pub url_prefix: String,
    /// Prefix prepended to every exported file name.
    pub filename_prefix: String,
}

impl ExportConfig {
    /// Builds the export naming scheme described by this section.
    #[must_use]
    pub fn naming(&self) -> ExportNaming {
        ExportNaming::new(self.url_prefix.as_str(), self.filename_prefix.as_str())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            url_prefix: DEFAULT_URL_PREFIX.to_owned(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_owned(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl ErrandConfig {
    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Loads configuration from `path`, or the defaults when `path` is
    /// `None`, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(file) => {
                tracing::debug!(path = %file.display(), "loading config file");
                let document = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
                    path: file.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&document)?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies overrides from an environment lookup.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.database.url = url;
        }
        self
    }
}
