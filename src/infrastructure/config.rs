//! Application configuration.
//!
//! A small JSON file next to the binary; every field has a default so a
//! missing file yields a working configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::domain::item::Category;
use crate::infrastructure::http_client::HttpClientConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Site base URL; category listing paths are joined onto this.
    pub base_url: String,
    pub database_url: String,
    /// Categories to seed into a fresh database. Already-known ids are
    /// left untouched, so this list is safe to keep around.
    pub categories: Vec<Category>,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.matsmart.se".to_string(),
            database_url: "sqlite:matsmartare.db".to_string(),
            categories: Vec::new(),
            http: HttpClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist.
    ///
    /// Deliberately does not log: it runs before the subscriber is
    /// installed, since the log level itself comes from here.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration back out, pretty-printed.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}
