//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Catalog traversal settings
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Where periodical and citation files live
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.crawl.max_depth == 0 {
            return Err(AppError::validation("crawl.max_depth must be > 0"));
        }
        if self.crawl.row_limit == 0 {
            return Err(AppError::validation("crawl.row_limit must be > 0"));
        }
        if self.crawl.terminal_models.is_empty() {
            return Err(AppError::validation(
                "crawl.terminal_models must name at least one model",
            ));
        }
        Ok(())
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Retries after a 5xx answer before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubled on every further retry
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            backoff_base_ms: defaults::backoff_base(),
        }
    }
}

/// Catalog traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Deepest expected level below the root (periodical → volume → issue → page)
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Catalog models whose children are never fetched
    #[serde(default = "defaults::terminal_models")]
    pub terminal_models: Vec<String>,

    /// Result-set ceiling enforced by the catalog per children query
    #[serde(default = "defaults::row_limit")]
    pub row_limit: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::max_depth(),
            terminal_models: defaults::terminal_models(),
            row_limit: defaults::row_limit(),
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; kramlink/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        5
    }
    pub fn backoff_base() -> u64 {
        1000
    }

    pub fn max_depth() -> usize {
        3
    }
    pub fn terminal_models() -> Vec<String> {
        vec!["page".into()]
    }
    pub fn row_limit() -> usize {
        4000
    }

    pub fn data_dir() -> String {
        "data".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let mut config = Config::default();
        config.crawl.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [http]
            max_retries = 2

            [crawl]
            terminal_models = ["page", "article"]
            "#,
        )
        .unwrap();

        assert_eq!(config.http.max_retries, 2);
        assert_eq!(config.http.backoff_base_ms, 1000);
        assert_eq!(config.crawl.max_depth, 3);
        assert_eq!(config.crawl.row_limit, 4000);
        assert_eq!(config.crawl.terminal_models.len(), 2);
        assert_eq!(config.storage.data_dir, "data");
    }

    #[test]
    fn test_toml_round_trip_keeps_values() {
        let mut config = Config::default();
        config.crawl.max_depth = 4;
        let text = config.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.crawl.max_depth, 4);
    }
}
