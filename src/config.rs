//! Configuration management for SmartStudy
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SmartStudyError};
use crate::types::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for SmartStudy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Application behavior configuration
    #[serde(default)]
    pub app: AppConfig,
}

/// Provider configuration
///
/// Specifies which generation provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Google Gemini provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for all features
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL
    ///
    /// Overridable so tests can point the gateway at a mock server.
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// API key; usually supplied through the environment instead of the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Per-request timeout (seconds), streaming included
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Application behavior configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language for prompts and messages
    #[serde(default)]
    pub locale: Locale,

    /// Chat view settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Chat view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Show the assistant greeting when a chat view opens
    #[serde(default = "default_show_greeting")]
    pub show_greeting: bool,
}

fn default_show_greeting() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_greeting: default_show_greeting(),
        }
    }
}

/// Environment variables checked for the API key, in priority order
const API_KEY_ENV_VARS: [&str; 3] = ["SMARTSTUDY_API_KEY", "GEMINI_API_KEY", "API_KEY"];

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
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
            .map_err(|e| SmartStudyError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SmartStudyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("SMARTSTUDY_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("SMARTSTUDY_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("SMARTSTUDY_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("SMARTSTUDY_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.provider.gemini.timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring invalid SMARTSTUDY_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(locale) = std::env::var("SMARTSTUDY_LOCALE") {
            match locale.parse() {
                Ok(value) => self.app.locale = value,
                Err(e) => tracing::warn!("Ignoring SMARTSTUDY_LOCALE: {}", e),
            }
        }

        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
        {
            self.provider.gemini.api_key = Some(key);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(model) = &cli.model {
            self.provider.gemini.model = model.clone();
        }

        if let Some(locale) = cli.locale {
            self.app.locale = locale;
        }
    }

    /// Validate the configuration
    ///
    /// The API key is not checked here; its absence is reported when a
    /// gateway is created, so offline commands still work.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(SmartStudyError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(SmartStudyError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.model.trim().is_empty() {
            return Err(SmartStudyError::Config("gemini.model cannot be empty".to_string()).into());
        }

        url::Url::parse(&self.provider.gemini.api_base).map_err(|e| {
            SmartStudyError::Config(format!(
                "gemini.api_base is not a valid URL ({}): {}",
                self.provider.gemini.api_base, e
            ))
        })?;

        if self.provider.gemini.timeout_seconds == 0 {
            return Err(SmartStudyError::Config(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.gemini.timeout_seconds > 3600 {
            return Err(SmartStudyError::Config(
                "gemini.timeout_seconds must be less than or equal to 3600".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
