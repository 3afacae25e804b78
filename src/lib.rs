//! ridepool: a client for the ride-pooling marketplace REST backend.
//!
//! Every request made through [`api::ApiClient`] carries the stored bearer
//! token. When the backend answers 401, one shared refresh cycle renews the
//! session while concurrent callers wait, and each rejected request is
//! replayed once with the renewed token.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ridepool::api::{ApiClient, ApiRequest, TracingSessionObserver};
//! use ridepool::auth::FileCredentialStore;
//! use ridepool::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let store = Arc::new(FileCredentialStore::at_default_path()?);
//! let client = ApiClient::from_config(&config, store, Arc::new(TracingSessionObserver));
//! let trips: serde_json::Value = client.send_json(&ApiRequest::get("/trips")).await?;
//! println!("{trips}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod build_info;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
#[cfg(test)]
pub mod testsupport;
