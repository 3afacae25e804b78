//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::{DEFAULT_API_BASE_URL, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH};
use super::env::apply_runtime_env_overrides;
use super::init::config_root_dir;
use super::sources::{read_config_text_with_sources, ConfigSource};
use super::Config;

/// Configuration payload plus the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_source(path_override)?.config)
}

/// Load configuration and report which source supplied it.
pub fn load_config_with_source(path_override: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    normalize(&mut config)?;
    tracing::debug!(source = %source, base_url = %config.api.base_url, "configuration loaded");
    Ok(LoadedConfig { config, source })
}

/// Trim values and fill blanks so downstream code can rely on them.
pub(super) fn normalize(config: &mut Config) -> Result<(), ConfigError> {
    config.api.base_url = normalize_base_url(&config.api.base_url)?;
    config.api.timeout_secs = config.api.timeout_secs.max(1);
    config.auth.refresh_timeout_secs = config.auth.refresh_timeout_secs.max(1);
    config.auth.login_path = normalize_path(&config.auth.login_path, DEFAULT_LOGIN_PATH);
    config.auth.refresh_path = normalize_path(&config.auth.refresh_path, DEFAULT_REFRESH_PATH);
    if config.api.user_agent.trim().is_empty() {
        config.api.user_agent = super::defaults::default_user_agent();
    }
    if config
        .auth
        .credentials_file
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        config.auth.credentials_file = None;
    }
    Ok(())
}

/// Trim a base URL and require an http(s) scheme. Blank means the default.
pub(super) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let base_url = raw.trim().trim_end_matches('/');
    if base_url.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Invalid(format!(
            "api.base_url `{base_url}` must start with http:// or https://"
        )));
    }
    Ok(base_url.to_string())
}

fn normalize_path(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
