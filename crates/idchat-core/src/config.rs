//! Configuration management for idchat.
//!
//! Loads configuration from ${IDCHAT_HOME}/config.toml with sensible defaults,
//! then applies `IDCHAT_*` environment overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::identity::IdentityConfig;

/// Environment variable overrides, checked after the file is parsed.
const ENV_CLIENT_ID: &str = "IDCHAT_CLIENT_ID";
const ENV_AUTHORITY: &str = "IDCHAT_AUTHORITY";
const ENV_REDIRECT_URI: &str = "IDCHAT_REDIRECT_URI";
const ENV_CHAT_ENDPOINT: &str = "IDCHAT_CHAT_ENDPOINT";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for idchat configuration and data files.
    //!
    //! IDCHAT_HOME resolution order:
    //! 1. IDCHAT_HOME environment variable (if set)
    //! 2. ~/.config/idchat (default)
    //! 3. ./.idchat when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the idchat home directory.
    pub fn idchat_home() -> PathBuf {
        if let Ok(home) = std::env::var("IDCHAT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".idchat"),
            |h| h.join(".config").join("idchat"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        idchat_home().join("config.toml")
    }

    /// Returns the path to the persistent token cache.
    pub fn token_cache_path() -> PathBuf {
        idchat_home().join("token_cache.json")
    }

    /// Returns the directory that holds log files.
    pub fn logs_dir() -> PathBuf {
        idchat_home().join("logs")
    }
}

/// Chat backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Full URL of the chat endpoint that receives `{"prompt": ...}`.
    pub endpoint: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: Config::DEFAULT_CHAT_ENDPOINT.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive (overridden by `IDCHAT_LOG`).
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity provider client parameters.
    pub identity: IdentityConfig,

    /// Chat backend parameters.
    pub chat: ChatConfig,

    /// Log filter settings.
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:8000/api/chat";

    /// Loads configuration from the default path and applies env overrides.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Applies overrides from a key lookup (the process environment in
    /// production). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_CLIENT_ID) {
            self.identity.client_id = value;
        }
        if let Some(value) = get(ENV_AUTHORITY) {
            self.identity.authority = value;
        }
        if let Some(value) = get(ENV_REDIRECT_URI) {
            self.identity.redirect_uri = value;
        }
        if let Some(value) = get(ENV_CHAT_ENDPOINT) {
            self.chat.endpoint = value;
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// Fails if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;
    use crate::identity::{CacheLocation, TokenKind};

    #[test]
    fn test_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.identity.scopes, vec!["openid", "profile", "email"]);
        assert_eq!(config.chat.endpoint, "http://localhost:8000/api/chat");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[identity]
client_id = "11111111-2222-3333-4444-555555555555"
cache_location = "memory"

[chat]
endpoint = "https://chat.example.com/api/chat"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.identity.client_id,
            "11111111-2222-3333-4444-555555555555"
        );
        assert_eq!(config.identity.cache_location, CacheLocation::Memory);
        assert_eq!(config.identity.token_kind, TokenKind::Id);
        assert_eq!(
            config.identity.authority,
            "https://login.microsoftonline.com/common"
        );
        assert_eq!(config.chat.endpoint, "https://chat.example.com/api/chat");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[identity\nclient_id = 1").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_overrides_replace_non_empty_values() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("IDCHAT_CLIENT_ID", "env-client"),
            ("IDCHAT_AUTHORITY", "  "),
            ("IDCHAT_CHAT_ENDPOINT", "http://127.0.0.1:9000/chat"),
        ]);

        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.identity.client_id, "env-client");
        assert_eq!(
            config.identity.authority,
            "https://login.microsoftonline.com/common"
        );
        assert_eq!(config.chat.endpoint, "http://127.0.0.1:9000/chat");
    }

    #[test]
    fn test_init_writes_template_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init(&path).unwrap();
        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.chat, ChatConfig::default());

        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
