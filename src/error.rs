//! Unified error types for the client.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// RefreshError
// ---------------------------------------------------------------------------

/// Failure of one token-refresh cycle.
///
/// Cloneable because a single failed refresh is fanned out to every caller
/// that was parked behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// Refresh endpoint answered with a non-2xx status.
    Status { code: u16, body: String },
    /// Network-level failure talking to the refresh endpoint.
    Transport(String),
    /// Refresh endpoint answered 2xx with an unusable body.
    InvalidResponse(String),
    /// Refresh call did not settle within the configured bound.
    Timeout(Duration),
    /// The caller driving the refresh went away before it settled.
    Abandoned,
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { code, body } => write!(f, "refresh rejected with status {code}: {body}"),
            Self::Transport(msg) => write!(f, "refresh transport error: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "invalid refresh response: {msg}"),
            Self::Timeout(after) => {
                write!(f, "refresh did not complete within {}s", after.as_secs_f64())
            }
            Self::Abandoned => write!(f, "refresh was abandoned before completion"),
        }
    }
}

impl std::error::Error for RefreshError {}

impl From<reqwest::Error> for RefreshError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status { code: u16, body: String },
    /// The session could not be renewed after an authorization failure.
    Refresh(RefreshError),
    /// The request could not be built (bad method, URL, or body).
    InvalidRequest(String),
    /// A successful response carried a body the caller could not decode.
    InvalidResponse(String),
}

impl ApiError {
    /// Build a status error.
    pub fn status(code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            code,
            body: body.into(),
        }
    }

    /// HTTP status code when this error came from a non-2xx response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for a 401 response from the API.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body } => write!(f, "status {code}: {body}"),
            Self::Refresh(e) => write!(f, "session: {e}"),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        Self::Refresh(e)
    }
}
