//! Token refresh invocation against the backend refresh endpoint.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::RefreshError;

use super::types::{CredentialPair, TokenPairResponse};

/// Exchanges a refresh token for a renewed credential pair.
///
/// Implementations must not route through the refreshing API client, or a
/// rejected refresh would re-enter the 401 recovery path.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<CredentialPair, RefreshError>;
}

/// Refresher that POSTs `{"refreshToken": ...}` to the backend.
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    http: reqwest::Client,
    url: String,
}

impl HttpTokenRefresher {
    /// Build a refresher with its own dedicated HTTP client.
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        Self::with_client(build_http_client(timeout, user_agent), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<CredentialPair, RefreshError> {
        tracing::debug!(url = %self.url, "requesting token refresh");
        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Status { code, body });
        }

        let payload: TokenPairResponse = response
            .json()
            .await
            .map_err(|err| RefreshError::InvalidResponse(err.to_string()))?;
        payload
            .into_pair(Some(refresh_token))
            .map_err(RefreshError::InvalidResponse)
    }
}

/// Build an HTTP client with timeout and user agent applied.
///
/// Auth endpoints and the API client each get their own instance, so refresh
/// traffic never passes through 401 recovery.
pub fn build_http_client(timeout: Duration, user_agent: &str) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
