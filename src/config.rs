//! Configuration loading and types for redraft
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (YAML), merged recursively over the defaults per key
//! 3. Environment variables (REDRAFT_*)
//!
//! The merged document is validated once and is read-only afterwards.

use crate::error::RedraftError;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Value shipped in the example config; never a usable key
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY_HERE";

/// Config file name looked up in the working directory and config dir
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Upper bound for `rate_limit.requests_per_minute`
pub const MAX_REQUESTS_PER_MINUTE: i64 = 60;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub gemini: GeminiConfig,

    /// Mode name -> key combination, e.g. `grammar_fix: cmd+shift+g`
    pub hotkeys: BTreeMap<String, String>,

    pub rate_limit: RateLimitConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key from https://aistudio.google.com/app/apikey
    pub api_key: String,

    /// Model name, e.g. "gemini-2.0-flash-exp"
    pub model: String,

    /// Attempts per rewrite before giving up
    pub max_retries: u32,

    /// Per-request timeout in seconds
    pub timeout: u64,

    /// Base URL of the Generative Language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// Request quota
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Maximum requests in any trailing 60 second window, 1..=60
    pub requests_per_minute: i64,
}

/// Notification preferences
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    pub show_notifications: bool,

    /// How long the success notification stays up, in seconds
    pub notification_duration: u64,
}

/// Log level and file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// DEBUG, INFO, WARNING, ERROR or CRITICAL (case-insensitive)
    pub level: String,

    /// Log file path; written in addition to the console
    pub file: PathBuf,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        let hotkeys = [
            ("grammar_fix", "cmd+shift+g"),
            ("formal", "cmd+shift+f"),
            ("casual", "cmd+shift+c"),
            ("simplify", "cmd+shift+s"),
            ("expand", "cmd+shift+e"),
        ]
        .into_iter()
        .map(|(mode, combo)| (mode.to_string(), combo.to_string()))
        .collect();

        Self {
            gemini: GeminiConfig {
                api_key: String::new(),
                model: "gemini-2.0-flash-exp".to_string(),
                max_retries: 3,
                timeout: 10,
                endpoint: default_endpoint(),
            },
            hotkeys,
            rate_limit: RateLimitConfig {
                requests_per_minute: 50,
            },
            ui: UiConfig {
                show_notifications: true,
                notification_duration: 2,
            },
            logging: LoggingConfig {
                level: "INFO".to_string(),
                file: PathBuf::from("redraft.log"),
            },
        }
    }
}

impl GeminiConfig {
    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl UiConfig {
    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_duration)
    }
}

impl LoggingConfig {
    /// Map the configured level to a tracing filter level.
    ///
    /// Accepts logging-module names (WARNING, CRITICAL) alongside the tracing
    /// ones. Unknown names fall back to "info".
    pub fn filter_level(&self) -> &'static str {
        match self.level.trim().to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" | "critical" | "fatal" => "error",
            "off" => "off",
            _ => "info",
        }
    }

    /// EnvFilter directive for this crate's logs
    pub fn filter_directive(&self) -> String {
        format!("redraft={},warn", self.filter_level())
    }
}

impl Config {
    /// Requests-per-minute quota, clamped to the valid range
    pub fn quota(&self) -> u32 {
        self.rate_limit
            .requests_per_minute
            .clamp(1, MAX_REQUESTS_PER_MINUTE) as u32
    }

    /// Configured hotkey bindings (mode name -> key combination)
    pub fn hotkeys(&self) -> &BTreeMap<String, String> {
        &self.hotkeys
    }

    /// Check required values and ranges
    pub fn validate(&self) -> Result<(), RedraftError> {
        let api_key = self.gemini.api_key.trim();
        if api_key.is_empty() || api_key == API_KEY_PLACEHOLDER {
            return Err(RedraftError::Config(
                "Gemini API key not configured.\n\
                 Please add your API key to config.yaml (gemini.api_key) or set REDRAFT_API_KEY.\n\
                 Get your key from: https://aistudio.google.com/app/apikey"
                    .to_string(),
            ));
        }

        let rpm = self.rate_limit.requests_per_minute;
        if rpm <= 0 || rpm > MAX_REQUESTS_PER_MINUTE {
            return Err(RedraftError::Config(format!(
                "requests_per_minute must be between 1 and {} (got {})",
                MAX_REQUESTS_PER_MINUTE, rpm
            )));
        }

        if self.gemini.max_retries == 0 {
            return Err(RedraftError::Config(
                "gemini.max_retries must be at least 1".to_string(),
            ));
        }

        if self.gemini.timeout == 0 {
            return Err(RedraftError::Config(
                "gemini.timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "redraft")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

/// Recursively merge `user` over `defaults`.
///
/// Mappings are merged per key; any other user value replaces the default.
/// A null user value keeps the default.
pub fn merge_with_defaults(user: Value, defaults: Value) -> Value {
    match (user, defaults) {
        (Value::Null, defaults) => defaults,
        (Value::Mapping(overrides), Value::Mapping(mut base)) => {
            for (key, value) in overrides {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_with_defaults(value, existing),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (user, _) => user,
    }
}

/// Parse a YAML document and merge it over the built-in defaults.
///
/// Does not validate; see [`Config::validate`].
pub fn parse_config(contents: &str) -> Result<Config, RedraftError> {
    let user: Value = if contents.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(contents).map_err(|e| {
            RedraftError::Config(format!("Invalid YAML in configuration file: {}", e))
        })?
    };

    if !matches!(user, Value::Null | Value::Mapping(_)) {
        return Err(RedraftError::Config(
            "Invalid configuration: top level must be a mapping of sections".to_string(),
        ));
    }

    let defaults = serde_yaml::to_value(Config::default())
        .map_err(|e| RedraftError::Config(format!("Failed to build defaults: {}", e)))?;

    serde_yaml::from_value(merge_with_defaults(user, defaults))
        .map_err(|e| RedraftError::Config(format!("Invalid configuration: {}", e)))
}

/// Resolve which config file to load.
///
/// `$REDRAFT_CONFIG` wins, then `./config.yaml`, then the per-user config
/// directory. Falls back to `./config.yaml` so the error names it.
pub fn resolve_config_path() -> PathBuf {
    choose_config_path(
        std::env::var_os("REDRAFT_CONFIG").map(PathBuf::from),
        PathBuf::from(CONFIG_FILE_NAME),
        Config::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)),
    )
}

/// Pick between an explicit path, a local file and the per-user file
pub fn choose_config_path(explicit: Option<PathBuf>, local: PathBuf, user: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }

    if local.exists() {
        return local;
    }

    match user {
        Some(user_path) if user_path.exists() => user_path,
        _ => local,
    }
}

/// Apply `REDRAFT_API_KEY`-style overrides; blank values are ignored
pub fn apply_env_overrides(config: &mut Config, api_key: Option<String>) {
    if let Some(key) = api_key {
        if !key.trim().is_empty() {
            config.gemini.api_key = key;
        }
    }
}

/// Load, merge and validate the configuration file at `path`.
///
/// `REDRAFT_API_KEY` replaces `gemini.api_key` when set.
pub fn load_config(path: &Path) -> Result<Config, RedraftError> {
    load_config_with(path, std::env::var("REDRAFT_API_KEY").ok())
}

/// Like [`load_config`], with the API key override passed explicitly
pub fn load_config_with(path: &Path, api_key: Option<String>) -> Result<Config, RedraftError> {
    if !path.exists() {
        return Err(RedraftError::Config(format!(
            "Configuration file not found: {}\n\
             Please copy config.example.yaml to that location and add your Gemini API key.",
            path.display()
        )));
    }

    tracing::debug!("Loading config from {:?}", path);
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RedraftError::Config(format!("Failed to read config: {}", e)))?;

    let mut config = parse_config(&contents)?;

    apply_env_overrides(&mut config, api_key);

    config.validate()?;
    tracing::info!("Configuration loaded successfully");
    Ok(config)
}
