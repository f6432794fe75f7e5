//! Configuration loading, validation, and management for ShotScore.
//!
//! Loads configuration from `~/.shotscore/config.toml` with environment
//! variable overrides for secrets. Validates all settings at startup.
//! The resulting `AppConfig` is immutable and passed into the pipeline at
//! construction — nothing reads process-wide state ad hoc.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.shotscore/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Slack bot token (xoxb-...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_bot_token: Option<String>,

    /// Slack app-level token (xapp-...) for Socket Mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_app_token: Option<String>,

    /// API key for the hosted vision model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Model identifier sent with every review request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens for the critique.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Reference store configuration.
    #[serde(default)]
    pub references: ReferenceConfig,

    /// Channel (chat platform) configuration.
    #[serde(default)]
    pub channel: ChannelConfig,
}

fn default_model() -> String {
    "gpt-4o".into()
}
fn default_max_tokens() -> u32 {
    500
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("slack_bot_token", &redact(&self.slack_bot_token))
            .field("slack_app_token", &redact(&self.slack_app_token))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("references", &self.references)
            .field("channel", &self.channel)
            .finish()
    }
}

/// Where the reference examples live and how many to include.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Directory containing the reference images.
    #[serde(default = "default_reference_dir")]
    pub directory: PathBuf,

    /// Path to the pipe-delimited performance table.
    #[serde(default = "default_table_path")]
    pub table_path: PathBuf,

    /// Number of reference examples to include per request.
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
}

fn default_reference_dir() -> PathBuf {
    AppConfig::config_dir().join("references")
}
fn default_table_path() -> PathBuf {
    default_reference_dir().join("performance.psv")
}
fn default_max_examples() -> usize {
    3
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            directory: default_reference_dir(),
            table_path: default_table_path(),
            max_examples: default_max_examples(),
        }
    }
}

/// Chat platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Allowlist of sender IDs. Empty = deny all, ["*"] = allow all.
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,
}

fn default_allowed_users() -> Vec<String> {
    vec!["*".into()]
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            allowed_users: default_allowed_users(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.shotscore/config.toml).
    ///
    /// Environment variables override file values for secrets:
    /// - `SLACK_BOT_TOKEN`
    /// - `SLACK_APP_TOKEN`
    /// - `OPENAI_API_KEY`
    /// - `SHOTSCORE_MODEL`
    /// - `SHOTSCORE_REFERENCE_DIR` / `SHOTSCORE_REFERENCE_TABLE`
    /// - `SHOTSCORE_MAX_EXAMPLES`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path (no env overrides).
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

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("SLACK_BOT_TOKEN") {
            self.slack_bot_token = Some(token);
        }
        if let Ok(token) = std::env::var("SLACK_APP_TOKEN") {
            self.slack_app_token = Some(token);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("SHOTSCORE_MODEL") {
            self.model = model;
        }
        if let Ok(dir) = std::env::var("SHOTSCORE_REFERENCE_DIR") {
            self.references.directory = PathBuf::from(dir);
        }
        if let Ok(table) = std::env::var("SHOTSCORE_REFERENCE_TABLE") {
            self.references.table_path = PathBuf::from(table);
        }
        if let Ok(n) = std::env::var("SHOTSCORE_MAX_EXAMPLES") {
            if let Ok(n) = n.parse() {
                self.references.max_examples = n;
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".shotscore")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }
        Ok(())
    }

    /// Whether all credentials needed for the daemon are present.
    pub fn has_daemon_credentials(&self) -> bool {
        self.slack_bot_token.is_some()
            && self.slack_app_token.is_some()
            && self.openai_api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack_bot_token: None,
            slack_app_token: None,
            openai_api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            references: ReferenceConfig::default(),
            channel: ChannelConfig::default(),
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
