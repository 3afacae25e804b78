//! `ridepool request` helpers.

use ridepool::api::{ApiRequest, BackendClient};
use ridepool::error::ApiError;
use ridepool::render::RenderSink;

/// Build a request from raw CLI arguments.
pub(crate) fn build_request(
    method: &str,
    path: &str,
    data: Option<&str>,
    query: &[String],
) -> Result<ApiRequest, String> {
    let method = ApiRequest::parse_method(method).map_err(|e| e.to_string())?;
    let path = path.trim();
    if path.is_empty() {
        return Err("request path must not be empty".to_string());
    }

    let mut request = ApiRequest::new(method, path);
    for pair in query {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("query parameter `{pair}` must look like key=value"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("query parameter `{pair}` has an empty key"));
        }
        request = request.query(key, value);
    }
    if let Some(data) = data {
        let body: serde_json::Value =
            serde_json::from_str(data).map_err(|e| format!("--data is not valid JSON: {e}"))?;
        request.body = Some(body);
    }
    Ok(request)
}

/// Send the request and print the body to stdout.
pub(crate) async fn run_request(
    renderer: &dyn RenderSink,
    client: &dyn BackendClient,
    request: &ApiRequest,
) -> Result<(), ApiError> {
    let response = client.send(request).await?;
    tracing::debug!(status = response.status, "request completed");
    if !response.body.is_empty() {
        renderer.body(&response.pretty_body());
    }
    Ok(())
}
