//! Password login against the backend.

use serde::Serialize;

use super::error::AuthError;
use super::types::{CredentialPair, TokenPairResponse};

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Exchange email/password for a credential pair.
///
/// The caller decides where to persist the returned pair.
pub async fn login_with_password(
    http: &reqwest::Client,
    url: &str,
    request: &LoginRequest,
) -> Result<CredentialPair, AuthError> {
    if request.email.trim().is_empty() {
        return Err(AuthError::Invalid("email cannot be empty".to_string()));
    }
    let response = http.post(url).json(request).send().await?;

    if !response.status().is_success() {
        let code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Status(code, body));
    }

    let payload: TokenPairResponse = response.json().await?;
    payload
        .into_pair(None)
        .map_err(|msg| AuthError::Invalid(format!("login {msg}")))
}
