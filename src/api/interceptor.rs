//! Outgoing-request bearer attachment.

use crate::auth::CredentialStore;

/// Read the access token to send with the next request.
///
/// Never fails: a store read error is logged and the request goes out
/// unauthenticated.
pub(crate) fn current_access_token(store: &dyn CredentialStore) -> Option<String> {
    match store.access_token() {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "could not read access token; sending request without it");
            None
        }
    }
}

/// Set `Authorization: Bearer <token>` when a token is present.
pub(crate) fn with_bearer(
    builder: reqwest::RequestBuilder,
    token: Option<&str>,
) -> reqwest::RequestBuilder {
    match token.filter(|value| !value.trim().is_empty()) {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}
