//! Tracing subscriber setup for the binary.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "RIDEPOOL_LOG";

/// Install a stderr `fmt` subscriber.
///
/// `RIDEPOOL_LOG` wins when set. Otherwise each `-v` raises the crate's
/// level one step from `warn`: `info`, `debug`, then `trace` for everything.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(verbosity: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(env_value.as_deref(), verbosity);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity > 1),
        )
        .try_init();
}

/// Pick the filter directive for the given env value and verbosity.
pub fn filter_directive(env_value: Option<&str>, verbosity: u8) -> String {
    if let Some(value) = env_value.map(str::trim).filter(|value| !value.is_empty()) {
        return value.to_string();
    }
    match verbosity {
        0 => "warn".to_string(),
        1 => "warn,ridepool=info".to_string(),
        2 => "warn,ridepool=debug".to_string(),
        _ => "trace".to_string(),
    }
}
