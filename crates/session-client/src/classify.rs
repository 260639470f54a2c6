//! Failure classification
//!
//! Sorts a transport outcome into the session layer's error taxonomy:
//! no response at all is `NetworkUnreachable`, 401/403 on a non-exempt
//! request is `AuthExpired`, and everything else non-2xx is
//! `ServerError` with the best message the response body offers.
//!
//! Exempt requests never classify as `AuthExpired`: a 401 from a login
//! or refresh endpoint is a genuine server answer, not a token expiry,
//! and must never feed back into the refresh flow.

use crate::error::SessionError;

/// Fallback when the error body carries no usable message.
const FALLBACK_MESSAGE: &str = "request failed";

/// Clearer rewrite for the server's missing-endpoint signature.
const MISSING_ENDPOINT_MESSAGE: &str = "the requested endpoint is not implemented on the server";

/// Classify a transport outcome.
///
/// Returns the response untouched on 2xx; otherwise consumes it to build
/// a `SessionError`.
pub(crate) async fn classify(
    outcome: Result<reqwest::Response, reqwest::Error>,
    exempt: bool,
) -> Result<reqwest::Response, SessionError> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => return Err(transport_error(e)),
    };

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if (status.as_u16() == 401 || status.as_u16() == 403) && !exempt {
        return Err(SessionError::AuthExpired {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(SessionError::ServerError {
        status: status.as_u16(),
        message: server_error_message(&body),
    })
}

/// Map a reqwest error (no response received) to `NetworkUnreachable`,
/// distinguishing timeouts from connection-level failures.
fn transport_error(e: reqwest::Error) -> SessionError {
    if e.is_timeout() {
        return SessionError::NetworkUnreachable {
            message: "request timed out before the server responded".into(),
            timed_out: true,
        };
    }
    let message = if e.is_connect() {
        format!("cannot reach the server: {e}")
    } else {
        format!("network error: {e}")
    };
    SessionError::NetworkUnreachable {
        message,
        timed_out: false,
    }
}

/// Extract the most useful message from a structured error body.
///
/// Recognized shapes, in order: `{"error": {"message": ...}}`, then
/// `{"message": ...}`, then a generic fallback. The server's
/// missing-endpoint signatures are rewritten into a clearer message.
pub(crate) fn server_error_message(body: &str) -> String {
    let mut message = FALLBACK_MESSAGE.to_string();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(m) = value["error"]["message"].as_str() {
            message = m.to_string();
        } else if let Some(m) = value["message"].as_str() {
            message = m.to_string();
        }
    }

    if message.contains("No static resource") || message.contains("NoResourceFoundException") {
        return MISSING_ENDPOINT_MESSAGE.to_string();
    }

    message
}
