//! Refresh endpoint wire call
//!
//! POSTs the stored refresh token to `{base}{refresh_path}` and parses
//! the server's envelope. This call deliberately bypasses the normal
//! request pipeline: it must never carry a bearer header and must never
//! itself be subject to auth-failure handling, so it goes straight to
//! the transport with its own (shorter) timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::CredentialPair;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Server envelope for the refresh endpoint.
///
/// Success shape:
/// `{"success": true, "data": {"accessToken": "...", "refreshToken": "..."}}`.
/// A 2xx response with `success: false` or a missing `data` field is
/// still a refresh failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RefreshData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Exchange a refresh token for a replacement credential pair.
///
/// Any transport failure, non-2xx status, or non-success envelope is a
/// refresh failure. A 401/403 from the refresh endpoint means the
/// refresh token itself was rejected and is reported distinctly.
pub async fn refresh_session(
    client: &reqwest::Client,
    base_url: &str,
    refresh_path: &str,
    refresh_token: &str,
    timeout: Duration,
) -> Result<CredentialPair> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), refresh_path);

    let response = client
        .post(&url)
        .timeout(timeout)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|e| Error::Http(format!("refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 401/403 means the refresh token is revoked or expired
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "refresh token rejected ({status}): {body}"
            )));
        }

        return Err(Error::RefreshRejected(format!(
            "refresh endpoint returned {status}: {body}"
        )));
    }

    let envelope = response
        .json::<RefreshEnvelope>()
        .await
        .map_err(|e| Error::RefreshRejected(format!("invalid refresh response: {e}")))?;

    match envelope {
        RefreshEnvelope {
            success: true,
            data: Some(data),
        } => Ok(CredentialPair::new(data.access_token, data.refresh_token)),
        _ => Err(Error::RefreshRejected(
            "refresh endpoint reported failure".into(),
        )),
    }
}
