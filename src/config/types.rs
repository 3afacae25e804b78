//! Configuration data model.
//!
//! This module holds struct definitions plus default values. Source
//! discovery and env overrides live in sibling modules so precedence
//! behavior stays centralized in the loader.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

use super::defaults::{
    default_user_agent, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_LOGIN_PATH,
    DEFAULT_REFRESH_PATH, DEFAULT_REFRESH_TIMEOUT_SECS,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Absolute URL of the login endpoint.
    pub fn login_url(&self) -> String {
        self.api.endpoint(&self.auth.login_path)
    }

    /// Absolute URL of the token refresh endpoint.
    pub fn refresh_url(&self) -> String {
        self.api.endpoint(&self.auth.refresh_path)
    }

    /// Point the client at another backend, validated like the file value.
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.api.base_url = super::loader::normalize_base_url(raw)?;
        Ok(())
    }
}

/// Backend connection settings under `[api]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        crate::api::endpoint_url(&self.base_url, path)
    }
}

/// Session endpoints and credential storage under `[auth]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub login_path: String,
    pub refresh_path: String,
    /// Upper bound on one refresh call before parked requests fail.
    pub refresh_timeout_secs: u64,
    /// Credential file override; the per-user default is used when unset.
    pub credentials_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.into(),
            refresh_path: DEFAULT_REFRESH_PATH.into(),
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
            credentials_file: None,
        }
    }
}

impl AuthConfig {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    /// Configured credential file, else the per-user default.
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.credentials_file
            .clone()
            .or_else(crate::auth::default_credentials_path)
    }
}

/// Terminal output settings under `[display]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Result of explicit global config initialization (`ridepool init`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalConfigInitResult {
    Created {
        path: PathBuf,
    },
    AlreadyInitialized {
        path: PathBuf,
    },
    Overwritten {
        path: PathBuf,
        backup_path: PathBuf,
    },
}
