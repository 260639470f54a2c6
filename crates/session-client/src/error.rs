//! Caller-visible classified errors
//!
//! Every failed call produces exactly one `SessionError`, created once by
//! the classifier (or the refresh coordinator) and never mutated. The
//! enum is `Clone` so a single refresh failure can be handed to every
//! queued waiter.

use thiserror::Error;

/// The session layer's uniform error contract.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// 401/403 on a non-exempt request. Recoverable once via refresh;
    /// surfacing this variant to the caller means the single retry was
    /// already spent.
    #[error("authentication expired (status {status})")]
    AuthExpired { status: u16 },

    /// The refresh attempt itself failed. The scope's credentials have
    /// been cleared and the session-expired signal has fired.
    #[error("session refresh failed for scope '{scope}': {message}")]
    RefreshFailed { scope: String, message: String },

    /// No response was received at all.
    #[error("{message}")]
    NetworkUnreachable { message: String, timed_out: bool },

    /// Any other non-2xx response, with the best message the body offered.
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },
}

impl SessionError {
    /// Whether this is an auth failure eligible for the refresh flow.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, SessionError::AuthExpired { .. })
    }

    /// Whether no response was received (connectivity-class failure).
    pub fn is_network_error(&self) -> bool {
        matches!(self, SessionError::NetworkUnreachable { .. })
    }

    /// Whether the failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SessionError::NetworkUnreachable { timed_out: true, .. }
        )
    }

    /// Whether the session was invalidated (refresh failed, credentials
    /// cleared).
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SessionError::RefreshFailed { .. })
    }
}

/// Result alias for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;
