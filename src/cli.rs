//! CLI argument parsing via clap.

use clap::{ArgAction, Parser, Subcommand};

/// Command-line client for the ride-pooling backend.
#[derive(Debug, Parser)]
#[command(
    name = "ridepool",
    version = ridepool::build_info::VERSION,
    long_version = ridepool::build_info::LONG_VERSION,
    after_help = ridepool::build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (default: ./ridepool.toml or ~/.config/ridepool/ridepool.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Keep credentials in memory only; nothing is read from or written to disk.
    #[arg(long = "ephemeral", global = true)]
    pub ephemeral: bool,

    /// Raise log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password and store the issued tokens.
    Login {
        /// Account email; prompted for when omitted.
        #[arg(long = "email")]
        email: Option<String>,
    },
    /// Forget stored credentials.
    Logout,
    /// Show configuration and stored-session state.
    Status,
    /// Send an authorized request and print the response body.
    Request {
        /// HTTP method, e.g. GET or POST.
        method: String,
        /// Path relative to the base URL, e.g. /trips.
        path: String,
        /// JSON request body.
        #[arg(short = 'd', long = "data")]
        data: Option<String>,
        /// Query parameter as key=value (repeatable).
        #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
    /// Write the default ~/.config/ridepool/ridepool.toml.
    Init {
        /// Overwrite an existing file after backing it up.
        #[arg(long = "force")]
        force: bool,
    },
}
