//! HTTP client for the ride-pooling backend.
//!
//! The API layer is split into cohesive modules:
//! - `request`: replayable request and buffered response types
//! - `interceptor`: bearer attachment from the credential store
//! - `refresh`: single-flight session renewal
//! - `session`: terminal "session ended" notifications
//! - `client`: dispatch and the refresh-once orchestration

use async_trait::async_trait;

use crate::error::ApiError;

mod client;
mod interceptor;
mod refresh;
mod request;
mod session;

pub use client::ApiClient;
pub(crate) use client::endpoint_url;
pub use refresh::{Recovery, RefreshCoordinator, DEFAULT_REFRESH_TIMEOUT};
pub use request::{ApiRequest, ApiResponse};
pub use session::{SessionEnd, SessionObserver, TracingSessionObserver};

/// Minimal backend interface used by command handlers.
///
/// This trait lets tests provide canned responses without network calls
/// while the production path uses [`ApiClient`].
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}
