//! Configuration file support for research-query.
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! host = "pubmed.ncbi.nlm.nih.gov"
//! default_field = "Title/Abstract"
//!
//! [fetch]
//! simulated_latency_ms = 1500
//! retry_attempts = 3
//! initial_backoff_ms = 500
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Config, FetchConfig, LoggingConfig, SearchConfig};

/// Configuration file structure
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Search section
    #[serde(default)]
    pub search: SearchConfig,

    /// Fetch section
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging section
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }

    /// Render as TOML text
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }
}

impl From<Config> for ConfigFile {
    fn from(config: Config) -> Self {
        Self {
            search: config.search,
            fetch: config.fetch,
            logging: config.logging,
        }
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
