//! Terminal session failure notifications.

use crate::error::RefreshError;

/// Why the session could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// A 401 arrived and no refresh token was stored.
    MissingRefreshToken,
    /// The refresh call itself failed; stored credentials were cleared.
    RefreshFailed(RefreshError),
}

impl std::fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRefreshToken => write!(f, "no refresh token is stored"),
            Self::RefreshFailed(err) => write!(f, "{err}"),
        }
    }
}

/// Receives the "session ended" signal so the application can send the user
/// back to a login surface.
pub trait SessionObserver: Send + Sync {
    fn session_expired(&self, reason: &SessionEnd);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionEnd) + Send + Sync,
{
    fn session_expired(&self, reason: &SessionEnd) {
        self(reason)
    }
}

/// Default observer: records the event and leaves navigation to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSessionObserver;

impl SessionObserver for TracingSessionObserver {
    fn session_expired(&self, reason: &SessionEnd) {
        tracing::warn!(reason = %reason, "session expired");
    }
}
