//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`RIDEPOOL_BASE_URL`, `RIDEPOOL_API_TIMEOUT_SECS`,
//!    `RIDEPOOL_REFRESH_TIMEOUT_SECS`, `RIDEPOOL_CREDENTIALS_FILE`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./ridepool.toml in the current directory
//! 4. $XDG_CONFIG_HOME/ridepool/ridepool.toml (or ~/.config/ridepool/ridepool.toml)
//! 5. Built-in defaults

mod defaults;
mod env;
mod init;
mod loader;
mod sources;
mod types;

pub use init::{config_root_dir, default_global_config_path, initialize_config_at_path};
pub use loader::{load_config, load_config_with_source, LoadedConfig};
pub use sources::ConfigSource;
pub use types::{ApiConfig, AuthConfig, Config, DisplayConfig, GlobalConfigInitResult};
