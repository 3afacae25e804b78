//! Binary-local application orchestration helpers.
//!
//! The main binary keeps wiring logic in `main.rs`, while this module hosts
//! command and render helpers to keep the entrypoint small.

pub(crate) mod commands;
pub(crate) mod init_flow;
#[cfg(test)]
pub(crate) mod testsupport;
