//! Compile-time build metadata exposed to CLI surfaces.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("RIDEPOOL_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("RIDEPOOL_BUILD_TIMESTAMP");

/// Help trailer block that surfaces build metadata in `ridepool --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("RIDEPOOL_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("RIDEPOOL_BUILD_TIMESTAMP")
);

/// Version block printed by `ridepool --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("RIDEPOOL_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("RIDEPOOL_BUILD_TIMESTAMP")
);

/// Default `User-Agent` carrying version and commit.
pub fn user_agent() -> String {
    format!("ridepool/{VERSION} ({GIT_COMMIT})")
}
