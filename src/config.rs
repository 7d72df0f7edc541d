//! Configuration management for llamachat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Precedence is CLI over environment over file over defaults.

use crate::cli::{Cli, Commands};
use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest temperature accepted by the completion endpoint
pub const MIN_TEMPERATURE: f32 = 0.0;

/// Highest temperature accepted by the completion endpoint
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Main configuration structure for llamachat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inference endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Session database settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Interactive chat behaviour
    #[serde(default)]
    pub chat: ChatConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Host address (`ip:port`) of the inference server.
    ///
    /// Expanded to `http://{host}/v1`. Usually supplied through `LLAMACPP_IP`.
    #[serde(default)]
    pub host: Option<String>,

    /// Full API base URL; takes precedence over `host` when set
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model name sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token; local servers accept any value
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "mistral-large-123b".to_string()
}

fn default_api_key() -> String {
    "fake".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: None,
            base_url: None,
            model: default_model(),
            api_key: default_api_key(),
            temperature: default_temperature(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the API base URL
    ///
    /// # Errors
    ///
    /// Returns `ChatError::MissingHost` when neither `base_url` nor `host`
    /// is configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use llamachat::config::ProviderConfig;
    ///
    /// let cfg = ProviderConfig {
    ///     host: Some("10.0.0.5:8080".to_string()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(cfg.endpoint().unwrap(), "http://10.0.0.5:8080/v1");
    /// ```
    pub fn endpoint(&self) -> Result<String> {
        if let Some(base) = self.base_url.as_deref().filter(|b| !b.trim().is_empty()) {
            return Ok(base.trim_end_matches('/').to_string());
        }
        match self.host.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => Ok(format!("http://{}/v1", host)),
            None => Err(ChatError::MissingHost.into()),
        }
    }
}

/// Session database configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit database file; defaults to the platform data directory
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of prompt characters used to title a fresh session
    #[serde(default = "default_title_length")]
    pub title_length: usize,

    /// Session count above which an archiving hint is shown
    #[serde(default = "default_large_session_warning")]
    pub large_session_warning: usize,
}

fn default_title_length() -> usize {
    7
}

fn default_large_session_warning() -> usize {
    100
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            title_length: default_title_length(),
            large_session_warning: default_large_session_warning(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("LLAMACPP_IP") {
            self.provider.host = Some(host);
        }

        if let Ok(base_url) = std::env::var("LLAMACHAT_BASE_URL") {
            self.provider.base_url = Some(base_url);
        }

        if let Ok(model) = std::env::var("LLAMACHAT_MODEL") {
            self.provider.model = model;
        }

        if let Ok(api_key) = std::env::var("LLAMACHAT_API_KEY") {
            self.provider.api_key = api_key;
        }

        if let Ok(temperature) = std::env::var("LLAMACHAT_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.provider.temperature = value;
            } else {
                tracing::warn!("Invalid LLAMACHAT_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(db_path) = std::env::var("LLAMACHAT_DB") {
            tracing::debug!(db_path = %db_path, "Env override: LLAMACHAT_DB");
            self.storage.db_path = Some(db_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(db_path) = &cli.db_path {
            self.storage.db_path = Some(db_path.clone());
        }

        if let Commands::Chat {
            model, temperature, ..
        } = &cli.command
        {
            if let Some(model) = model {
                self.provider.model = model.clone();
            }
            if let Some(temperature) = temperature {
                self.provider.temperature = *temperature;
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any value is outside its accepted range
    pub fn validate(&self) -> Result<()> {
        validate_temperature(self.provider.temperature)?;

        if self.provider.model.trim().is_empty() {
            return Err(ChatError::Config("provider.model cannot be empty".to_string()).into());
        }

        if self.chat.title_length == 0 {
            return Err(
                ChatError::Config("chat.title_length must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}

/// Check that a temperature lies in `MIN_TEMPERATURE..=MAX_TEMPERATURE`
pub fn validate_temperature(temperature: f32) -> Result<()> {
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(ChatError::InvalidTemperature(temperature).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("cli parse")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.model, "mistral-large-123b");
        assert_eq!(config.provider.api_key, "fake");
        assert_eq!(config.provider.temperature, 1.0);
        assert_eq!(config.chat.title_length, 7);
        assert_eq!(config.chat.large_session_warning, 100);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_temperature_bounds() {
        let mut config = Config::default();
        config.provider.temperature = 2.0;
        assert!(config.validate().is_ok());
        config.provider.temperature = 0.0;
        assert!(config.validate().is_ok());
        config.provider.temperature = 2.1;
        assert!(config.validate().is_err());
        config.provider.temperature = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.provider.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_title_length() {
        let mut config = Config::default();
        config.chat.title_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_from_host() {
        let cfg = ProviderConfig {
            host: Some("127.0.0.1:8080".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint().unwrap(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn test_endpoint_prefers_base_url() {
        let cfg = ProviderConfig {
            host: Some("127.0.0.1:8080".to_string()),
            base_url: Some("http://mock:9000/v1/".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.endpoint().unwrap(), "http://mock:9000/v1");
    }

    #[test]
    fn test_endpoint_missing_host() {
        let err = ProviderConfig::default().endpoint().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::MissingHost)
        ));
    }

    #[test]
    fn test_parse_yaml_with_partial_sections() {
        let yaml = r#"
provider:
  host: "10.1.1.1:8000"
  temperature: 0.4
chat:
  title_length: 12
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(config.provider.host.as_deref(), Some("10.1.1.1:8000"));
        assert_eq!(config.provider.temperature, 0.4);
        assert_eq!(config.provider.model, "mistral-large-123b");
        assert_eq!(config.chat.title_length, 12);
        assert_eq!(config.chat.large_session_warning, 100);
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        std::env::remove_var("LLAMACHAT_MODEL");
        let config = Config::load("/nonexistent/config.yaml", &cli(&["llamachat", "chat"]))
            .expect("load");
        assert_eq!(config.provider.model, "mistral-large-123b");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("LLAMACPP_IP", "192.168.1.10:8080");
        std::env::set_var("LLAMACHAT_MODEL", "qwen");
        std::env::set_var("LLAMACHAT_TEMPERATURE", "0.3");

        let config = Config::load("/nonexistent/config.yaml", &cli(&["llamachat", "chat"]))
            .expect("load");
        assert_eq!(config.provider.host.as_deref(), Some("192.168.1.10:8080"));
        assert_eq!(config.provider.model, "qwen");
        assert_eq!(config.provider.temperature, 0.3);

        std::env::remove_var("LLAMACPP_IP");
        std::env::remove_var("LLAMACHAT_MODEL");
        std::env::remove_var("LLAMACHAT_TEMPERATURE");
    }

    #[test]
    #[serial]
    fn test_invalid_env_temperature_is_ignored() {
        std::env::set_var("LLAMACHAT_TEMPERATURE", "warm");
        let config = Config::load("/nonexistent/config.yaml", &cli(&["llamachat", "chat"]))
            .expect("load");
        assert_eq!(config.provider.temperature, 1.0);
        std::env::remove_var("LLAMACHAT_TEMPERATURE");
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        std::env::set_var("LLAMACHAT_MODEL", "from-env");
        let config = Config::load(
            "/nonexistent/config.yaml",
            &cli(&[
                "llamachat",
                "--db-path",
                "/tmp/x.db",
                "chat",
                "--model",
                "from-cli",
                "--temperature",
                "1.5",
            ]),
        )
        .expect("load");
        assert_eq!(config.provider.model, "from-cli");
        assert_eq!(config.provider.temperature, 1.5);
        assert_eq!(config.storage.db_path.as_deref(), Some("/tmp/x.db"));
        std::env::remove_var("LLAMACHAT_MODEL");
    }
}
