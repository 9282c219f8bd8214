//! # Configuration Management
//!
//! Centralized configuration for the framing layer.
//!
//! The domain codecs take their size ceilings from [`Limits`]; these are the
//! only defence against hostile peers announcing huge names, messages or
//! histories, so every decode call is made against an explicit `Limits` value.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Major component of the history binary format this crate writes and accepts
pub const HISTORY_FORMAT_MAJOR: u16 = 1;

/// Minor component of the history binary format this crate writes
pub const HISTORY_FORMAT_MINOR: u16 = 0;

/// Character limit of the user-name field in stored options
pub const DEFAULT_USER_NAME_CHARACTERS: usize = 256;

/// Highest priority a chat serialization method may declare
pub const MAX_METHOD_PRIORITY: f64 = 10.0;

/// Lowest priority a chat serialization method may declare
pub const MIN_METHOD_PRIORITY: f64 = 0.0;

/// Priority of a chat serialization method that does not choose one
pub const DEFAULT_METHOD_PRIORITY: f64 = 5.0;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProtocolConfig {
    /// Decode ceilings
    #[serde(default)]
    pub limits: Limits,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProtocolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        let limits = &mut config.limits;

        for (var, slot) in [
            ("LOCALCHAT_MAX_USER_NAME_LENGTH", &mut limits.max_user_name_length),
            ("LOCALCHAT_MAX_MESSAGE_LENGTH", &mut limits.max_message_length),
            ("LOCALCHAT_MAX_CHAT_NAME_LENGTH", &mut limits.max_chat_name_length),
            ("LOCALCHAT_MAX_METHOD_NAME_LENGTH", &mut limits.max_method_name_length),
            ("LOCALCHAT_MAX_USER_COUNT", &mut limits.max_user_count),
            ("LOCALCHAT_MAX_MESSAGE_COUNT", &mut limits.max_message_count),
        ] {
            if let Ok(raw) = std::env::var(var) {
                *slot = raw.parse::<usize>().map_err(|e| {
                    ProtocolError::ConfigError(format!("Invalid value for {var}: {e}"))
                })?;
            }
        }

        if let Ok(level) = std::env::var("LOCALCHAT_LOG_LEVEL") {
            config.logging.log_level = level
                .parse::<Level>()
                .map_err(|_| ProtocolError::ConfigError(format!("Invalid log level: {level}")))?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.limits.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Decode ceilings for the domain codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum characters in a user name
    pub max_user_name_length: usize,

    /// Maximum characters in a chat message
    pub max_message_length: usize,

    /// Maximum characters in a chat name
    pub max_chat_name_length: usize,

    /// Maximum characters in a chat serialization method name
    pub max_method_name_length: usize,

    /// Maximum distinct senders in a message history
    pub max_user_count: usize,

    /// Maximum messages in a message history
    pub max_message_count: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_user_name_length: 64,
            max_message_length: 64 * 1024,
            max_chat_name_length: 64,
            max_method_name_length: 64,
            max_user_count: 1024,
            max_message_count: 65_536,
        }
    }
}

impl Limits {
    /// Validate limit values
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value, ceiling) in [
            ("max_user_name_length", self.max_user_name_length, 4096),
            ("max_message_length", self.max_message_length, 16 * 1024 * 1024),
            ("max_chat_name_length", self.max_chat_name_length, 4096),
            ("max_method_name_length", self.max_method_name_length, 4096),
            ("max_user_count", self.max_user_count, 1_000_000),
            ("max_message_count", self.max_message_count, 10_000_000),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be greater than 0"));
            } else if value > ceiling {
                errors.push(format!(
                    "{name} too large: {value} (maximum recommended: {ceiling})"
                ));
            }
        }

        if self.max_user_name_length < 2 {
            errors.push("max_user_name_length must allow at least 2 characters".to_string());
        }

        errors
    }
}

/// Logging configuration consumed by [`crate::init_logging`]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Reported in the startup event
    pub app_name: String,

    /// Default filter level; `RUST_LOG` overrides it
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Write to stderr
    pub console: bool,

    /// Also append to this file
    pub file: Option<PathBuf>,

    /// JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("localchat-protocol"),
            log_level: Level::INFO,
            console: true,
            file: None,
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match self.file.as_deref().and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
                errors.push(format!("Log file directory does not exist: {}", dir.display()));
            }
            _ => {}
        }

        if !self.console && self.file.is_none() {
            errors.push("No logging output: enable console or set a log file".to_string());
        }

        errors
    }
}

mod log_level_serde {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.as_str().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| D::Error::custom(format!("Invalid log level: {raw}")))
    }
}
