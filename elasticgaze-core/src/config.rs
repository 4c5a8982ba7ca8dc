//! Configuration management
//!
//! Handles:
//! - HTTP client settings (timeout, user agent, certificate checks)
//! - Logging level for the front ends
//! - Named connection profiles and the default profile
//! - Cross-platform storage (`<config_dir>/elasticgaze/config.toml`)

use crate::error::{GazeError, Result};
use crate::profile::ConnectionProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "ELASTICGAZE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    pub http: HttpSettings,
    pub logging: LoggingConfig,
    pub profiles: Vec<ConnectionProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Skip certificate verification (self-signed cluster certificates)
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            default_profile: None,
            http: HttpSettings::default(),
            logging: LoggingConfig::default(),
            profiles: Vec::new(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "ElasticGaze/1.0".to_string(),
            accept_invalid_certs: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GazeConfig {
    /// Load config from `$ELASTICGAZE_CONFIG` or the OS-specific location
    pub async fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_file_path()?,
        };
        Self::load_from(&path).await
    }

    /// Load config from an explicit path; a missing file yields the defaults
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GazeError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| GazeError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Save config, creating parent directories as needed
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GazeError::Config(format!("cannot create {}: {e}", parent.display())))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GazeError::Config(format!("cannot serialize config: {e}")))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| GazeError::Config(format!("cannot write {}: {e}", path.display())))
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| GazeError::Config("could not find config directory".into()))?;

        path.push("elasticgaze");
        path.push("config.toml");
        Ok(path)
    }

    /// Profile by name; without a name, the default profile, else the first one
    pub fn profile(&self, name: Option<&str>) -> Option<&ConnectionProfile> {
        match name.or(self.default_profile.as_deref()) {
            Some(name) => self.profiles.iter().find(|p| p.name == name),
            None => self.profiles.first(),
        }
    }
}
