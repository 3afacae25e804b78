//! `ridepool init`: write the commented config template.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE};
use super::GlobalConfigInitResult;

/// Per-user config file, `<config root>/ridepool/ridepool.toml`.
pub fn default_global_config_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Write the template to `path`.
///
/// An existing file is kept unless `force` is set. With `force` it is moved
/// to `<name>.bak` first, replacing any earlier backup.
pub fn initialize_config_at_path(
    path: &Path,
    force: bool,
) -> Result<GlobalConfigInitResult, ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let backup_path = match (path.exists(), force) {
        (false, _) => None,
        (true, false) => {
            return Ok(GlobalConfigInitResult::AlreadyInitialized {
                path: path.to_path_buf(),
            })
        }
        (true, true) => {
            let backup = backup_path_for(path);
            std::fs::rename(path, &backup)?;
            Some(backup)
        }
    };

    let path = path.to_path_buf();
    if !write_template(&path)? {
        // Another process created the file between the check and the write.
        return Ok(GlobalConfigInitResult::AlreadyInitialized { path });
    }
    Ok(match backup_path {
        Some(backup_path) => GlobalConfigInitResult::Overwritten { path, backup_path },
        None => GlobalConfigInitResult::Created { path },
    })
}

/// `false` when the file already exists.
fn write_template(path: &Path) -> Result<bool, ConfigError> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(ConfigError::Io(err)),
    };
    file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())?;
    Ok(true)
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from(CONFIG_FILE_NAME));
    name.push(".bak");
    path.with_file_name(name)
}

/// `$XDG_CONFIG_HOME`, else `~/.config`, else the platform config dir.
pub fn config_root_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .or_else(dirs::config_dir)
}
