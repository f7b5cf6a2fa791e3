//! Configuration management.
//!
//! Configuration is read from a JSON file:
//! ```json
//! { "bot_token": "123:abc", "gate_scope": "chat" }
//! ```
//! Search order is an explicit path, then `~/.ca-blocker/config.json`, then
//! environment variables (`BOT_TOKEN`, `CA_BLOCKER_GATE_SCOPE`) after loading
//! any `.env` file.

use crate::error::ConfigError;
use crate::gate::GateScope;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "BOT_TOKEN";

/// Environment variable selecting the gate scope.
pub const SCOPE_ENV: &str = "CA_BLOCKER_GATE_SCOPE";

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs_config_dir().join("config.json")
}

/// Get the .ca-blocker config directory path.
fn dirs_config_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".ca-blocker"))
        .unwrap_or_else(|| PathBuf::from(".ca-blocker"))
}

/// JSON configuration file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    bot_token: String,
    #[serde(default)]
    gate_scope: GateScope,
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Whether block windows are per chat or shared
    pub gate_scope: GateScope,
    pub source: ConfigSource,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &mask_token(&self.bot_token))
            .field("gate_scope", &self.gate_scope)
            .field("source", &self.source)
            .finish()
    }
}

impl Config {
    /// Load configuration from JSON file, falling back to environment variables.
    ///
    /// Search order:
    /// 1. Provided config_path (must exist if given)
    /// 2. `~/.ca-blocker/config.json`
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::from_json(&path);
        }

        let default_path = default_config_path();
        if default_path.exists() {
            return Self::from_json(&default_path);
        }

        Self::from_env()
    }

    /// Load configuration from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&content)?;

        if file.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingField("bot_token".to_string()));
        }

        Ok(Self {
            bot_token: file.bot_token.trim().to_string(),
            gate_scope: file.gate_scope,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env files (silently ignore if not found)
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_path(dirs_config_dir().join(".env"));

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup(TOKEN_ENV)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(TOKEN_ENV.to_string()))?;

        let gate_scope = match lookup(SCOPE_ENV) {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse::<GateScope>().map_err(ConfigError::InvalidScope)?
            }
            _ => GateScope::default(),
        };

        Ok(Self {
            bot_token,
            gate_scope,
            source: ConfigSource::Environment,
        })
    }
}

/// Hide all but the bot id part of a token.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) => format!("{}:***", id),
        None => "***".to_string(),
    }
}
