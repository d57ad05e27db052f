//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the translation pipeline
///
/// Built once and passed into the translator and collaborators explicitly;
/// nothing reads the environment after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// API key for the completion backend
    pub api_key: String,
    /// OpenAI-compatible API base, e.g. `https://api.openai.com/v1`
    pub api_endpoint: String,
    /// Model used for batch translation
    pub model: String,
    /// Model used for dataset-module code generation
    pub module_model: String,
    /// Maximum attempts per batch (first try included)
    pub max_retries: u32,
    /// Delay between retry attempts, in seconds
    pub sleep_time: f64,
    /// Number of cell values sent per translation batch
    pub batch_size: usize,
    /// HTTP request timeout in milliseconds
    pub timeout_ms: u64,
    /// Read token for the datasets server (optional)
    pub hf_token: Option<String>,
    /// Write token for pushing datasets to the Hub
    pub hf_write_token: Option<String>,
    /// GitHub API token for pull-request creation
    pub github_token: Option<String>,
    /// Target GitHub repository, `owner/name`
    pub github_repo: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            api_endpoint: std::env::var("API_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: "gpt-4o-mini".to_string(),
            module_model: "gpt-4o".to_string(),
            max_retries: 3,
            sleep_time: 1.0,
            batch_size: 16,
            timeout_ms: 120_000,
            hf_token: None,
            hf_write_token: None,
            github_token: None,
            github_repo: None,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable is required"))?;

        let api_endpoint = std::env::var("API_ENDPOINT")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = std::env::var("MODEL_TRANSLATION")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let module_model = std::env::var("MODEL_MODULE")
            .unwrap_or_else(|_| "gpt-4o".to_string());

        let max_retries = std::env::var("TRANSLATION_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()?;

        let sleep_time = std::env::var("TRANSLATION_SLEEP_TIME")
            .unwrap_or_else(|_| "1.0".to_string())
            .parse::<f64>()?;

        let batch_size = std::env::var("BATCH_SIZE")
            .unwrap_or_else(|_| "16".to_string())
            .parse::<usize>()?;

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "120000".to_string())
            .parse::<u64>()?;

        Ok(Self {
            api_key,
            api_endpoint,
            model,
            module_model,
            max_retries,
            sleep_time,
            batch_size,
            timeout_ms,
            hf_token: std::env::var("HF_API_TOKEN").ok(),
            hf_write_token: std::env::var("HF_ACCESS_TOKEN").ok(),
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            github_repo: std::env::var("GITHUB_REPO").ok(),
        })
    }

    /// Load and validate configuration from the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.api_endpoint.is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.model.is_empty() {
            return Err(anyhow::anyhow!("translation model is required"));
        }

        if self.max_retries == 0 {
            return Err(anyhow::anyhow!("max_retries must be greater than 0"));
        }

        if self.sleep_time < 0.0 {
            return Err(anyhow::anyhow!("sleep_time must not be negative"));
        }

        if self.batch_size == 0 {
            return Err(anyhow::anyhow!("batch_size must be greater than 0"));
        }

        Ok(())
    }

    /// Retry delay as a `Duration`
    pub fn sleep_duration(&self) -> Duration {
        Duration::from_secs_f64(self.sleep_time)
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TranslatorConfig {
        TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = TranslatorConfig {
            api_key: "".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_retries() {
        let config = TranslatorConfig {
            max_retries: 0,
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_batch_size() {
        let config = TranslatorConfig {
            batch_size: 0,
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sleep_duration() {
        let config = TranslatorConfig {
            sleep_time: 0.5,
            ..test_config()
        };

        assert_eq!(config.sleep_duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = test_config();
        config.to_file(&path).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api_key, config.api_key);
        assert_eq!(loaded.batch_size, config.batch_size);
        assert_eq!(loaded.max_retries, config.max_retries);
    }
}
