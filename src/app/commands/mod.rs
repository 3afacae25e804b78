//! Subcommand helper modules used by the CLI entrypoint.

/// `ridepool request` helpers.
pub(crate) mod request;
/// `login`, `logout`, and `status` helpers.
pub(crate) mod session;
