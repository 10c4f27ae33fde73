//! Application configuration management.
//!
//! `Config` is the user-editable file at `~/.config/medqc/config.json`
//! (API origin, timeout, last username). `PipelineConfig` is what the request
//! pipeline is built from; it is resolved once at startup from defaults, the
//! file and the environment, and never changes afterwards.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "medqc";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend origin used when nothing else is configured
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:8000";

/// Path prefix of every backend endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Request timeout in milliseconds.
/// Inference calls on the backend can be slow.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Environment variable overriding the API origin
pub const ENV_API_BASE_URL: &str = "MEDQC_API_BASE_URL";

/// Environment variable overriding the request timeout
pub const ENV_TIMEOUT_MS: &str = "MEDQC_TIMEOUT_MS";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_origin: Option<String>,
    pub timeout_ms: Option<u64>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolve the pipeline settings from the process environment.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        self.pipeline_config_with(|key| std::env::var(key).ok())
    }

    /// Resolve the pipeline settings with an explicit environment lookup.
    /// Environment beats the config file, which beats the defaults.
    pub fn pipeline_config_with<F>(&self, env: F) -> Result<PipelineConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = env(ENV_API_BASE_URL)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.api_origin.clone())
            .unwrap_or_else(|| DEFAULT_API_ORIGIN.to_string());

        let timeout_ms = match env(ENV_TIMEOUT_MS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a number of milliseconds", ENV_TIMEOUT_MS))?,
            None => self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };

        Ok(PipelineConfig::new(&origin, Duration::from_millis(timeout_ms)))
    }
}

/// Fixed settings of the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// `{origin}/api/v1`, without a trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

impl PipelineConfig {
    pub fn new(origin: &str, timeout: Duration) -> Self {
        Self {
            base_url: format!("{}{}", origin.trim_end_matches('/'), API_PREFIX),
            timeout,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_ORIGIN, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default().pipeline_config_with(|_| None).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8000/api/v1");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = Config {
            api_origin: Some("http://file:9000".to_string()),
            timeout_ms: Some(5_000),
            last_username: None,
        };

        let from_file = file.pipeline_config_with(|_| None).unwrap();
        assert_eq!(from_file.base_url, "http://file:9000/api/v1");
        assert_eq!(from_file.timeout, Duration::from_secs(5));

        let from_env = file
            .pipeline_config_with(|key| match key {
                ENV_API_BASE_URL => Some("https://qc.example.org/".to_string()),
                ENV_TIMEOUT_MS => Some("1500".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(from_env.base_url, "https://qc.example.org/api/v1");
        assert_eq!(from_env.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_blank_env_origin_is_ignored() {
        let cfg = Config::default()
            .pipeline_config_with(|key| (key == ENV_API_BASE_URL).then(|| "  ".to_string()))
            .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let result = Config::default()
            .pipeline_config_with(|key| (key == ENV_TIMEOUT_MS).then(|| "soon".to_string()));
        assert!(result.is_err());
    }
}
