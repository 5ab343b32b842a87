//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes endpoint overrides, the persistent token backend, feature
//! toggles for the account view, and the last email used to log in.
//!
//! Configuration is stored at `~/.config/coursework/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_API_BASE_URL, DEFAULT_QUIZ_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "coursework";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment overrides
const ENV_API_URL: &str = "COURSEWORK_API_URL";
const ENV_QUIZ_URL: &str = "COURSEWORK_QUIZ_URL";

/// Where tokens saved with "keep me logged in" go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistentBackend {
    #[default]
    File,
    Keyring,
}

/// Capabilities offered by the account view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginFeatures {
    /// Show the "keep me logged in" checkbox. When off, tokens are always ephemeral.
    pub remember_me: bool,
    /// Allow editing name and bio
    pub profile_editing: bool,
    /// Notify the service on logout
    pub remote_logout: bool,
}

impl Default for LoginFeatures {
    fn default() -> Self {
        Self {
            remember_me: true,
            profile_editing: true,
            remote_logout: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub quiz_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub token_fields: Option<Vec<String>>,
    #[serde(default)]
    pub persistent_backend: PersistentBackend,
    #[serde(default)]
    pub features: LoginFeatures,
    pub last_email: Option<String>,
    /// Overrides the platform data directory for tokens and logs
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persistent token file and logs: the configured
    /// `data_dir`, else the platform data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Auth service base URL: env var, then config, then default
    pub fn api_base_url(&self) -> String {
        resolve(ENV_API_URL, self.api_base_url.as_deref(), DEFAULT_API_BASE_URL)
    }

    pub fn quiz_url(&self) -> String {
        resolve(ENV_QUIZ_URL, self.quiz_url.as_deref(), DEFAULT_QUIZ_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

fn resolve(env_key: &str, configured: Option<&str>, default: &str) -> String {
    std::env::var(env_key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.persistent_backend, PersistentBackend::File);
        assert_eq!(config.features, LoginFeatures::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "api_base_url": "http://localhost:8080",
            "request_timeout_secs": 3,
            "token_fields": ["jwt"],
            "persistent_backend": "keyring",
            "features": {"remember_me": false},
            "last_email": "a@b.com"
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.persistent_backend, PersistentBackend::Keyring);
        assert!(!config.features.remember_me);
        // Unspecified feature flags keep their defaults
        assert!(config.features.profile_editing);
        assert!(config.features.remote_logout);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.token_fields.as_deref(), Some(&["jwt".to_string()][..]));
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_configured_data_dir() {
        let config: Config = serde_json::from_str(r#"{"data_dir": "/tmp/coursework-data"}"#).unwrap();
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/coursework-data"));

        let config = Config::default();
        if let Ok(dir) = config.data_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_resolve_order() {
        assert_eq!(
            resolve("COURSEWORK_TEST_UNSET_VAR", Some("http://cfg"), "http://default"),
            "http://cfg"
        );
        assert_eq!(
            resolve("COURSEWORK_TEST_UNSET_VAR", None, "http://default"),
            "http://default"
        );
    }
}
