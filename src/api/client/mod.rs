//! Authenticated backend client.
//!
//! Every request carries the stored access token. A 401 hands control to the
//! shared [`RefreshCoordinator`]; the request is replayed at most once with
//! the renewed token, and a second 401 is returned to the caller as-is.

mod transport;

pub(crate) use transport::endpoint_url;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::interceptor::current_access_token;
use super::refresh::{Recovery, RefreshCoordinator};
use super::request::{ApiRequest, ApiResponse};
use super::session::SessionObserver;
use super::BackendClient;
use crate::auth::{build_http_client, CredentialStore, HttpTokenRefresher};
use crate::config::{ApiConfig, Config};
use crate::error::ApiError;

/// Client for the ride-pooling REST backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Build a client around an existing coordinator.
    ///
    /// Clients that share one coordinator also share one refresh cycle.
    pub fn new(config: &ApiConfig, coordinator: Arc<RefreshCoordinator>) -> Self {
        Self {
            http: build_http_client(config.timeout(), &config.user_agent),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            coordinator,
        }
    }

    /// Build the client, refresher, and coordinator from resolved config.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let refresher = HttpTokenRefresher::new(
            config.refresh_url(),
            config.api.timeout(),
            &config.api.user_agent,
        );
        let coordinator = RefreshCoordinator::new(store, Arc::new(refresher))
            .with_observer(observer)
            .with_refresh_timeout(config.auth.refresh_timeout());
        Self::new(&config.api, Arc::new(coordinator))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        self.coordinator.store()
    }

    /// Send a request, renewing the session once if it is rejected with 401.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = current_access_token(self.store().as_ref());
        let first = transport::dispatch(&self.http, &self.base_url, request, token.as_deref()).await;
        let rejected = match first {
            Err(err) if err.is_unauthorized() => err,
            other => return other,
        };

        match self.coordinator.recover(token.as_deref()).await? {
            Recovery::NoSession => Err(rejected),
            Recovery::Renewed(renewed) => {
                tracing::debug!(path = %request.path, "replaying request with renewed token");
                // Single replay: a second 401 goes straight back to the caller.
                transport::dispatch(&self.http, &self.base_url, request, Some(&renewed)).await
            }
        }
    }

    /// Send a request and decode the 2xx body as JSON.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }
}

#[async_trait]
impl BackendClient for ApiClient {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        ApiClient::send(self, request).await
    }
}
