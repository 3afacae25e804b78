//! Public credential model types.

use serde::{Deserialize, Serialize};

/// Access/refresh token pair issued by the backend.
///
/// Serialized with the backend's storage keys (`accessToken`,
/// `refreshToken`) so files exported from the web console load as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Access token, or `None` when blank.
    pub fn access(&self) -> Option<&str> {
        non_blank(&self.access_token)
    }

    /// Refresh token, or `None` when blank.
    pub fn refresh(&self) -> Option<&str> {
        non_blank(&self.refresh_token)
    }
}

/// Snapshot of what the credential store currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHealth {
    pub has_access_token: bool,
    pub has_refresh_token: bool,
}

impl CredentialHealth {
    pub(crate) fn of(pair: Option<&CredentialPair>) -> Self {
        Self {
            has_access_token: pair.and_then(CredentialPair::access).is_some(),
            has_refresh_token: pair.and_then(CredentialPair::refresh).is_some(),
        }
    }
}

/// Token endpoint response shape shared by login and refresh.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenPairResponse {
    #[serde(alias = "access_token", default)]
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
    #[serde(alias = "refresh_token", default)]
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

impl TokenPairResponse {
    /// Validate the payload into a credential pair.
    ///
    /// `refresh_fallback` is kept when the endpoint omits a rotated refresh
    /// token.
    pub(crate) fn into_pair(self, refresh_fallback: Option<&str>) -> Result<CredentialPair, String> {
        let access_token = self.access_token.unwrap_or_default().trim().to_string();
        if access_token.is_empty() {
            return Err("response did not include accessToken".to_string());
        }
        let refresh_token = self
            .refresh_token
            .filter(|value| !value.trim().is_empty())
            .or_else(|| refresh_fallback.map(str::to_string))
            .unwrap_or_default()
            .trim()
            .to_string();
        if refresh_token.is_empty() {
            return Err("response did not include refreshToken".to_string());
        }
        Ok(CredentialPair {
            access_token,
            refresh_token,
        })
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
