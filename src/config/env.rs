//! Environment variable overrides.
//!
//! `RIDEPOOL_*` variables win over every file source.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_BASE_URL: &str = "RIDEPOOL_BASE_URL";
pub(super) const ENV_API_TIMEOUT_SECS: &str = "RIDEPOOL_API_TIMEOUT_SECS";
pub(super) const ENV_REFRESH_TIMEOUT_SECS: &str = "RIDEPOOL_REFRESH_TIMEOUT_SECS";
pub(super) const ENV_CREDENTIALS_FILE: &str = "RIDEPOOL_CREDENTIALS_FILE";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_blank(env_lookup, ENV_BASE_URL) {
        config.api.base_url = url;
    }
    if let Some(timeout) = non_blank(env_lookup, ENV_API_TIMEOUT_SECS) {
        config.api.timeout_secs = parse_secs(ENV_API_TIMEOUT_SECS, &timeout)?;
    }
    if let Some(timeout) = non_blank(env_lookup, ENV_REFRESH_TIMEOUT_SECS) {
        config.auth.refresh_timeout_secs = parse_secs(ENV_REFRESH_TIMEOUT_SECS, &timeout)?;
    }
    if let Some(path) = non_blank(env_lookup, ENV_CREDENTIALS_FILE) {
        config.auth.credentials_file = Some(PathBuf::from(path));
    }
    Ok(())
}

fn non_blank<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, ConfigError> {
    // Clamp to at least 1 second to avoid accidental "no timeout" behavior.
    raw.parse::<u64>().map(|secs| secs.max(1)).map_err(|_| {
        ConfigError::Invalid(format!(
            "invalid {name} value `{raw}`: expected positive integer seconds"
        ))
    })
}
