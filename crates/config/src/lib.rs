//! Configuration loading, validation, and management for Homie.
//!
//! Loads configuration from `~/.homie/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.homie/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion provider API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider name (selects the base URL)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,

    /// Completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Override the built-in persona instructions entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_override: Option<String>,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Knowledge store configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Drive sync configuration
    #[serde(default)]
    pub drive: DriveConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("provider_url", &self.provider_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("persona_override", &self.persona_override)
            .field("gateway", &self.gateway)
            .field("knowledge", &self.knowledge)
            .field("drive", &self.drive)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Persist the store to disk (in-memory only when false)
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Override the store file path (default: ~/.homie/knowledge.toml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            persist: true,
            path: None,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    /// OAuth bearer token for the Drive API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Default folder to sync when none is given in the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl std::fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveConfig")
            .field("access_token", &redact(&self.access_token))
            .field("folder_id", &self.folder_id)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.homie/config.toml).
    ///
    /// Environment variable overrides, highest priority first:
    /// - `HOMIE_API_KEY`, then `OPENAI_API_KEY`
    /// - `HOMIE_MODEL`
    /// - `DRIVE_ACCESS_TOKEN`, then `GOOGLE_ACCESS_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("HOMIE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("HOMIE_MODEL") {
            config.model = model;
        }

        if config.drive.access_token.is_none() {
            config.drive.access_token = std::env::var("DRIVE_ACCESS_TOKEN")
                .ok()
                .or_else(|| std::env::var("GOOGLE_ACCESS_TOKEN").ok());
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".homie")
    }

    /// The knowledge store path, honoring the config override.
    pub fn knowledge_path(&self) -> PathBuf {
        self.knowledge
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("knowledge.toml"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a provider API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if Drive credentials are available.
    pub fn has_drive_token(&self) -> bool {
        self.drive.access_token.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            provider_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            persona_override: None,
            gateway: GatewayConfig::default(),
            knowledge: KnowledgeConfig::default(),
            drive: DriveConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
