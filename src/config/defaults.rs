//! Default configuration constants.
//!
//! Keeping defaults in one module lets the data model, the loader, and the
//! embedded template share the same literals.

/// Embedded default `ridepool.toml` template written by `ridepool init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/ridepool.toml");
/// Directory name under the config root.
pub(super) const CONFIG_DIR_NAME: &str = "ridepool";
/// Config file name, both local and global.
pub(super) const CONFIG_FILE_NAME: &str = "ridepool.toml";
/// Default backend REST root.
pub(super) const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
/// Default timeout for ordinary API requests.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
/// Default login endpoint path.
pub(super) const DEFAULT_LOGIN_PATH: &str = "/auth/login";
/// Default token refresh endpoint path.
pub(super) const DEFAULT_REFRESH_PATH: &str = "/auth/refresh-token";
/// Default bound on one refresh call.
pub(super) const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header value.
pub(super) fn default_user_agent() -> String {
    crate::build_info::user_agent()
}
