//! HTTP transport helpers for backend requests.

use crate::api::interceptor::with_bearer;
use crate::api::request::{ApiRequest, ApiResponse};
use crate::error::ApiError;

/// Join a base URL and a request path with exactly one slash between them.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{base}/{path}")
}

/// Send one request with the given bearer token and buffer the response.
///
/// Non-2xx statuses come back as [`ApiError::Status`] so the caller can
/// inspect the code before deciding whether to recover.
pub(super) async fn dispatch(
    http: &reqwest::Client,
    base_url: &str,
    request: &ApiRequest,
    bearer: Option<&str>,
) -> Result<ApiResponse, ApiError> {
    if request.path.contains("://") {
        // Absolute URLs would carry the bearer token to another host.
        return Err(ApiError::InvalidRequest(format!(
            "request path must be relative to the base URL, got `{}`",
            request.path
        )));
    }

    let url = endpoint_url(base_url, &request.path);
    let mut builder = http.request(request.method.clone(), &url);
    if !request.query.is_empty() {
        builder = builder.query(&request.query);
    }
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }
    builder = with_bearer(builder, bearer);

    tracing::debug!(method = %request.method, url = %url, "dispatching request");
    let response = builder.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    if !(200..300).contains(&status) {
        tracing::debug!(status, "request rejected");
        return Err(ApiError::status(status, body));
    }
    Ok(ApiResponse { status, body })
}
