//! Connection profiles
//!
//! A profile is the immutable set of connection settings for one cluster:
//! host, port, TLS flag, authentication method and optional credentials.

use crate::error::{AuthError, GazeError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 9200;

/// Authentication schemes understood by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    None,
    Basic,
    ApiKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::Basic => "basic",
            AuthMethod::ApiKey => "apikey",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AuthMethod::None),
            "basic" => Ok(AuthMethod::Basic),
            "apikey" => Ok(AuthMethod::ApiKey),
            other => Err(AuthError::UnsupportedAuthMethod(other.to_string())),
        }
    }
}

/// Connection settings for one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, alias = "ssl_or_https")]
    pub tls: bool,
    #[serde(default = "default_auth_method", alias = "authentication_method")]
    pub auth_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_auth_method() -> String {
    AuthMethod::None.as_str().to_string()
}

impl ConnectionProfile {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            name: String::new(),
            host: host.into(),
            port,
            tls: false,
            auth_method: default_auth_method(),
            username: None,
            password: None,
            api_key: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth_method = AuthMethod::Basic.as_str().to_string();
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.auth_method = AuthMethod::ApiKey.as_str().to_string();
        self.api_key = Some(api_key.into());
        self
    }

    /// Parsed authentication method
    pub fn auth(&self) -> Result<AuthMethod, AuthError> {
        self.auth_method.parse()
    }

    /// Normalized copy: rejects an empty host, defaults an empty auth method to `none`
    pub fn validated(&self) -> Result<Self> {
        if self.host.trim().is_empty() {
            return Err(GazeError::validation("host", "Host is required"));
        }
        let mut profile = self.clone();
        if profile.auth_method.trim().is_empty() {
            profile.auth_method = default_auth_method();
        }
        Ok(profile)
    }

    /// Label used in logs: the profile name, else `host:port`
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("{}:{}", self.host, self.port)
        } else {
            self.name.clone()
        }
    }
}
