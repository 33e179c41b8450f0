//! Configuration management.
//!
//! Defaults come from code. [`load_config`] layers a TOML file and
//! `RESEARCH_QUERY_*` environment variables on top; [`get_config`] applies
//! only the environment when no file exists, e.g.
//! `RESEARCH_QUERY_SEARCH__HOST=pubmed.example.org`.

mod file_config;

pub use file_config::{ConfigFile, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::SearchField;
use crate::utils::{RetryConfig, DEFAULT_SEARCH_HOST};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "RESEARCH_QUERY";

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "research-query.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// External search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Result fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that serde cannot validate on its own
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.search.validate()?;
        if self.fetch.retry_attempts == 0 {
            return Err(ConfigFileError::Invalid(
                "fetch.retry_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// External search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Host of the external search page
    #[serde(default = "default_host")]
    pub host: String,

    /// Field used for CLI terms given without a `Field:` prefix
    #[serde(default)]
    pub default_field: SearchField,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            default_field: SearchField::default(),
        }
    }
}

impl SearchConfig {
    /// The host must form a valid `https://<host>/` URL with no path or query
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        let host = self.host.trim_end_matches('/');
        let parsed = url::Url::parse(&format!("https://{}/", host))
            .map_err(|e| ConfigFileError::Invalid(format!("search.host '{}': {}", self.host, e)))?;

        if parsed.host_str().is_none() || parsed.path() != "/" || parsed.query().is_some() {
            return Err(ConfigFileError::Invalid(format!(
                "search.host '{}' must be a bare host name",
                self.host
            )));
        }
        Ok(())
    }
}

fn default_host() -> String {
    DEFAULT_SEARCH_HOST.to_string()
}

/// Result fetch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Latency simulated by the mock source, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub simulated_latency_ms: u64,

    /// Attempts per fetch, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Backoff before the first retry, in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: default_latency_ms(),
            retry_attempts: default_retry_attempts(),
            initial_backoff_ms: default_backoff_ms(),
        }
    }
}

impl FetchConfig {
    /// Simulated latency as a duration
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Retry policy for fetches
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .max_attempts(self.retry_attempts)
            .initial_delay(Duration::from_millis(self.initial_backoff_ms))
    }
}

fn default_latency_ms() -> u64 {
    1500
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither `RUST_LOG` nor `-v` is given
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log line format: `text` (default) or `json`
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    /// Whether log lines should be written as JSON
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build_config(Some(path), environment())
}

/// Code defaults with environment overrides, for when no file is found
pub fn get_config() -> Result<Config, config::ConfigError> {
    build_config(None, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(
    path: Option<&Path>,
    env: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder.add_source(env).build()?.try_deserialize()
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|path| path.is_file())
}

/// Per-user config file location, e.g. `~/.config/research-query/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("research-query").join("config.toml"))
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    paths.extend(user_config_path());
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.host, "pubmed.ncbi.nlm.nih.gov");
        assert_eq!(config.search.default_field, SearchField::TitleAbstract);
        assert_eq!(config.fetch.latency(), Duration::from_millis(1500));
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetch_retry_config() {
        let fetch = FetchConfig {
            simulated_latency_ms: 0,
            retry_attempts: 5,
            initial_backoff_ms: 20,
        };
        let retry = fetch.retry_config();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.initial_delay, Duration::from_millis(20));
    }

    #[test]
    fn test_load_config_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("research-query.toml");
        std::fs::write(
            &path,
            "[search]\nhost = \"pubmed.example.org\"\ndefault_field = \"Title\"\n\n[fetch]\nretry_attempts = 4\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.search.host, "pubmed.example.org");
        assert_eq!(config.search.default_field, SearchField::Title);
        assert_eq!(config.fetch.retry_attempts, 4);
        assert_eq!(config.fetch.simulated_latency_ms, 1500);
    }

    fn env_vars(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_env_overrides_without_file() {
        let config = build_config(
            None,
            env_vars(&[
                ("RESEARCH_QUERY_SEARCH__HOST", "pubmed.example.org"),
                ("RESEARCH_QUERY_SEARCH__DEFAULT_FIELD", "tiab"),
                ("RESEARCH_QUERY_FETCH__RETRY_ATTEMPTS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.search.host, "pubmed.example.org");
        assert_eq!(config.search.default_field, SearchField::TitleAbstract);
        assert_eq!(config.fetch.retry_attempts, 5);
        assert_eq!(config.fetch.simulated_latency_ms, 1500);
    }

    #[test]
    fn test_no_file_no_env_gives_defaults() {
        let config = build_config(None, env_vars(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("research-query.toml");
        std::fs::write(&path, "[fetch]\nretry_attempts = 4\n").unwrap();

        let config = build_config(
            Some(&path),
            env_vars(&[
                ("RESEARCH_QUERY_FETCH__RETRY_ATTEMPTS", "7"),
                ("RESEARCH_QUERY_SEARCH__DEFAULT_FIELD", "mh"),
            ]),
        )
        .unwrap();
        assert_eq!(config.fetch.retry_attempts, 7);
        assert_eq!(config.search.default_field, SearchField::MeshTerms);
    }

    #[test]
    fn test_load_config_missing_or_invalid_file() {
        let dir = tempdir().unwrap();
        assert!(load_config(&dir.path().join("missing.toml")).is_err());

        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_host() {
        let mut config = Config::default();
        config.search.host = "example.org/search?x=1".to_string();
        assert!(matches!(config.validate(), Err(ConfigFileError::Invalid(_))));

        config.search.host = "example.org/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.fetch.retry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_candidate_paths_start_with_working_dir() {
        assert_eq!(candidate_paths()[0], PathBuf::from(CONFIG_FILE_NAME));
    }
}
