//! Configuration loading
//!
//! Settings come from `rowcraft.toml` when present, then `ROWCRAFT_*`
//! environment variables override individual keys.

use crate::error::{Error, ErrorContext, Result};
use crate::models::query_builder::{DatabaseBackend, SqlBuilder};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// File looked up by [`Config::load`]
pub const DEFAULT_FILE: &str = "rowcraft.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Dialect name, e.g. `postgres`, `mysql` or `sqlite`
    #[serde(default = "default_dialect")]
    pub dialect: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log finished statements at debug level
    #[serde(default)]
    pub log_sql: bool,
}

fn default_dialect() -> String {
    "postgres".to_string()
}

impl Config {
    /// Load `rowcraft.toml` from the working directory, or defaults
    pub fn load() -> Result<Self> {
        Self::load_with_base_dir(".")
    }

    /// Load configuration from a specific base directory
    ///
    /// A missing file yields the defaults. Environment overrides are
    /// applied in both cases.
    pub fn load_with_base_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let path = base_dir.as_ref().join(DEFAULT_FILE);

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            log::debug!("No {} found, using default configuration", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let content = fs::read_to_string(path_ref).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path_ref.display()))?;

        log::debug!(
            "Successfully loaded configuration from: {}",
            path_ref.display()
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `ROWCRAFT_DIALECT` and `ROWCRAFT_LOG_SQL`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup, e.g. a map in tests
    ///
    /// An unsupported dialect name is logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dialect) = lookup("ROWCRAFT_DIALECT") {
            match dialect.parse::<DatabaseBackend>() {
                Ok(_) => self.database.dialect = dialect.trim().to_string(),
                Err(_) => log::warn!(
                    "Ignoring ROWCRAFT_DIALECT={}: unsupported dialect",
                    dialect
                ),
            }
        }

        if let Some(flag) = lookup("ROWCRAFT_LOG_SQL") {
            self.logging.log_sql = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Check that the configured dialect is supported
    pub fn validate(&self) -> Result<()> {
        self.backend().map(|_| ())
    }

    pub fn backend(&self) -> Result<DatabaseBackend> {
        self.database.dialect.parse()
    }

    /// Builder for the configured dialect and logging
    pub fn builder(&self) -> Result<SqlBuilder> {
        Ok(SqlBuilder::for_backend(self.backend()?).with_sql_logging(self.logging.log_sql))
    }
}
